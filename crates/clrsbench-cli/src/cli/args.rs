//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "clrsbench",
    version,
    about = "Benchmark prompting strategies on CLRS-Text algorithmic traces against an OpenAI-compatible endpoint"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Run(RunArgs),
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Model identifier passed through to the chat-completions endpoint
    #[arg(long)]
    pub model: String,

    /// Which strategy datasets to run: letters from b,r,c,s
    /// (base, react, cot, scope)
    #[arg(long, default_value = "brcs")]
    pub datasets: String,

    /// Prompt cap per strategy; clamped to the smallest selected collection
    #[arg(long, default_value_t = 1000)]
    pub n_prompts: usize,

    /// Worker pool size (default: 2x host parallelism, minimum 8)
    #[arg(long)]
    pub n_workers: Option<usize>,

    /// Retry budget per prompt (0 = single attempt)
    #[arg(long, default_value_t = 0)]
    pub n_retries: u32,

    /// Per-call network timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Base URL of the OpenAI-compatible endpoint
    #[arg(long, default_value = "http://0.0.0.0:30000/v1")]
    pub base_url: String,

    /// Bearer key for the endpoint (locally served models ignore it)
    #[arg(long, env = "CLRSBENCH_API_KEY", default_value = "sk")]
    pub api_key: String,

    /// Directory holding the per-strategy benchmark_dataset_3000_*.json files
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory for the per-strategy output/error logs (created, truncated)
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Directory for the per-strategy model_responses_*.json artifacts
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}
