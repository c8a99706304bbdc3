//! Loading of the pre-built per-strategy prompt collections. The collections
//! are produced by the sampling stage and read fully into memory before any
//! network call is made.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::model::{BenchmarkRecord, Strategy, WorkItem};

/// File naming scheme shared with the dataset-preparation stage.
pub fn collection_path(data_dir: &Path, strategy: Strategy) -> PathBuf {
    data_dir.join(format!("benchmark_dataset_3000_{}.json", strategy.label()))
}

/// Load every selected strategy's collection, preserving selector order.
/// A missing or unparsable file is a config error: it surfaces before
/// dispatch, never mid-batch.
pub fn load_collections(
    data_dir: &Path,
    strategies: &[Strategy],
) -> anyhow::Result<Vec<(Strategy, Vec<BenchmarkRecord>)>> {
    let mut collections = Vec::with_capacity(strategies.len());
    for &strategy in strategies {
        let path = collection_path(data_dir, strategy);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read prompt collection {}", path.display()))?;
        let records: Vec<BenchmarkRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse prompt collection {}", path.display()))?;
        tracing::debug!(strategy = strategy.label(), records = records.len(), "loaded collection");
        collections.push((strategy, records));
    }
    Ok(collections)
}

/// Clamp the configured cap to the smallest loaded collection so every
/// strategy contributes equally many units.
pub fn effective_prompt_count(
    cap: usize,
    collections: &[(Strategy, Vec<BenchmarkRecord>)],
) -> usize {
    collections
        .iter()
        .map(|(_, records)| records.len())
        .min()
        .map_or(0, |smallest| cap.min(smallest))
}

/// Flatten all strategies into one combined work list. Indices are 1-based
/// and local to each strategy lane.
pub fn build_work_list(
    collections: &[(Strategy, Vec<BenchmarkRecord>)],
    n_prompts: usize,
) -> Vec<(WorkItem, BenchmarkRecord)> {
    let mut units = Vec::with_capacity(collections.len() * n_prompts);
    for (strategy, records) in collections {
        for (i, record) in records.iter().take(n_prompts).enumerate() {
            units.push((
                WorkItem {
                    index: i + 1,
                    strategy: *strategy,
                },
                record.clone(),
            ));
        }
    }
    units
}
