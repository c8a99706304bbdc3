use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One prompting-template variant applied to the sampled CLRS-Text problems.
/// The finite set is known at compile time; lane guards and dataset paths are
/// keyed by these variants, never by free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Base,
    React,
    Cot,
    Scope,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Base => "base",
            Strategy::React => "react",
            Strategy::Cot => "cot",
            Strategy::Scope => "scope",
        }
    }

    fn from_letter(c: char) -> Option<Strategy> {
        match c {
            'b' => Some(Strategy::Base),
            'r' => Some(Strategy::React),
            'c' => Some(Strategy::Cot),
            's' => Some(Strategy::Scope),
            _ => None,
        }
    }

    /// Parse a `--datasets` selector such as `"brcs"` into an ordered,
    /// deduplicated strategy list. Any letter outside b/r/c/s is a config
    /// error and must be rejected before dispatch starts.
    pub fn parse_selector(selector: &str) -> anyhow::Result<Vec<Strategy>> {
        let mut strategies = Vec::new();
        for c in selector.chars() {
            let s = Strategy::from_letter(c).ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown dataset letter '{}' in --datasets (expected a subset of b,r,c,s)",
                    c
                )
            })?;
            if !strategies.contains(&s) {
                strategies.push(s);
            }
        }
        if strategies.is_empty() {
            anyhow::bail!("--datasets selected no strategies (expected a subset of b,r,c,s)");
        }
        Ok(strategies)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One pre-built benchmark prompt, produced by the dataset-preparation stage.
/// The collections on disk carry extra fields (worked examples etc.); those
/// are ignored on load and never travel past the dispatch boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub category: String,
    #[serde(default)]
    pub algorithm: String,
    pub question: String,
    pub answer: String,
    pub prompt: String,
}

/// Identity of one dispatch unit: 1-based index local to its strategy lane.
/// Used for log attribution only; two items from different strategies may
/// share an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub index: usize,
    pub strategy: Strategy,
}

/// The fields kept for downstream scoring, plus the model's reply (or the
/// failure sentinel when every attempt was exhausted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub category: String,
    pub question: String,
    pub answer: String,
    pub model_output: String,
}

/// Exactly one of these exists per submitted work unit, success or failure.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub strategy: Strategy,
    pub record: ResponseRecord,
}

/// Fully resolved run parameters. Built once at startup and passed by
/// reference into the engine and logging constructors; read-only afterwards.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub model: String,
    pub strategies: Vec<Strategy>,
    /// Effective prompt count per strategy, already clamped to the smallest
    /// loaded collection so every strategy contributes equally many units.
    pub n_prompts: usize,
    pub n_workers: usize,
    pub n_retries: u32,
    pub timeout_secs: u64,
    pub base_url: String,
    pub api_key: String,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub out_dir: PathBuf,
}
