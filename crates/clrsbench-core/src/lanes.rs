//! Per-strategy append logging. Every strategy owns two lanes — output and
//! error — each protected by its own guard so writers on different strategies
//! never contend. Files are re-opened in append mode per entry; a crash loses
//! at most the in-flight line.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::model::{Strategy, WorkItem};

struct LaneFile {
    path: PathBuf,
}

impl LaneFile {
    /// Append one formatted entry. The caller holds the lane guard, so the
    /// entry cannot interleave with another writer on the same file.
    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut f = OpenOptions::new().append(true).create(true).open(&self.path)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")
    }
}

struct Lane {
    out: Mutex<LaneFile>,
    err: Mutex<LaneFile>,
}

/// One lane pair per strategy, pre-allocated from the finite strategy set at
/// startup. Guards are never created lazily.
pub struct LaneSet {
    lanes: HashMap<Strategy, Lane>,
}

/// Model replies span many lines; a log entry is exactly one line, so inner
/// newlines are escaped before the guard section formats the entry.
fn flatten(text: &str) -> String {
    text.replace('\r', "").replace('\n', "\\n")
}

impl LaneSet {
    /// Create (truncating) both log files for every selected strategy.
    pub fn create(log_dir: &Path, strategies: &[Strategy]) -> anyhow::Result<Self> {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;

        let mut lanes = HashMap::new();
        for &strategy in strategies {
            let out_path = log_dir.join(format!("{}_output.log", strategy.label()));
            let err_path = log_dir.join(format!("{}_error.log", strategy.label()));
            for path in [&out_path, &err_path] {
                File::create(path)
                    .with_context(|| format!("failed to create log file {}", path.display()))?;
            }
            lanes.insert(
                strategy,
                Lane {
                    out: Mutex::new(LaneFile { path: out_path }),
                    err: Mutex::new(LaneFile { path: err_path }),
                },
            );
        }
        Ok(Self { lanes })
    }

    /// Record a unit's final content (reply or failure sentinel). Echoed to
    /// stdout so a human can tail progress live.
    pub fn log_output(&self, item: WorkItem, text: &str) {
        let Some(lane) = self.lanes.get(&item.strategy) else {
            return;
        };
        let guard = lane.out.lock().expect("output lane guard");
        let line = format!("[{}/{}] {}", item.index, item.strategy, flatten(text));
        println!("{}", line);
        if let Err(e) = guard.append(&line) {
            eprintln!("WARNING: failed to append {} output log: {}", item.strategy, e);
        }
    }

    /// Record one failed attempt, tagged with the retries still unspent.
    /// Error lanes never reach stdout; the console stays reply-only.
    pub fn log_error(&self, item: WorkItem, retries_left: u32, error: &str) {
        let Some(lane) = self.lanes.get(&item.strategy) else {
            return;
        };
        let guard = lane.err.lock().expect("error lane guard");
        let line = format!(
            "[{}/{}] attempt failed ({} retries left): {}",
            item.index,
            item.strategy,
            retries_left,
            flatten(error)
        );
        if let Err(e) = guard.append(&line) {
            eprintln!("WARNING: failed to append {} error log: {}", item.strategy, e);
        }
    }

    pub fn output_log_path(&self, strategy: Strategy) -> Option<PathBuf> {
        self.lanes
            .get(&strategy)
            .map(|l| l.out.lock().expect("output lane guard").path.clone())
    }

    pub fn error_log_path(&self, strategy: Strategy) -> Option<PathBuf> {
        self.lanes
            .get(&strategy)
            .map(|l| l.err.lock().expect("error lane guard").path.clone())
    }
}
