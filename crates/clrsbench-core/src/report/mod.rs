//! Regrouping of dispatch outcomes into per-strategy artifacts. Grouping runs
//! only after the whole batch has drained; arrival order within a group is
//! engine-completion order and has no scoring significance.

pub mod console;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::model::{DispatchOutcome, ResponseRecord, Strategy};

/// Model identifiers such as `Qwen/Qwen2.5-7B` must stay one path component
/// when used in artifact names.
pub fn sanitize_model_id(model: &str) -> String {
    model.replace(['/', ':', '\\'], "-")
}

pub fn artifact_path(out_dir: &Path, model: &str, strategy: Strategy) -> PathBuf {
    out_dir.join(format!(
        "model_responses_{}_{}.json",
        sanitize_model_id(model),
        strategy.label()
    ))
}

/// Partition outcomes back into one group per strategy, preserving arrival
/// order within each group. Every outcome lands in exactly one group.
pub fn group_outcomes(
    strategies: &[Strategy],
    outcomes: Vec<DispatchOutcome>,
) -> Vec<(Strategy, Vec<ResponseRecord>)> {
    let mut grouped: Vec<(Strategy, Vec<ResponseRecord>)> =
        strategies.iter().map(|&s| (s, Vec::new())).collect();
    for outcome in outcomes {
        if let Some((_, records)) = grouped.iter_mut().find(|(s, _)| *s == outcome.strategy) {
            records.push(outcome.record);
        }
    }
    grouped
}

/// Persist one artifact per strategy. A write failure here is fatal for the
/// run; artifacts already written for earlier strategies are left in place.
pub fn write_artifacts(
    out_dir: &Path,
    model: &str,
    grouped: &[(Strategy, Vec<ResponseRecord>)],
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    let mut paths = Vec::with_capacity(grouped.len());
    for (strategy, records) in grouped {
        let path = artifact_path(out_dir, model, *strategy);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create result artifact {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)
            .with_context(|| format!("failed to write result artifact {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("failed to flush result artifact {}", path.display()))?;
        paths.push(path);
    }
    Ok(paths)
}
