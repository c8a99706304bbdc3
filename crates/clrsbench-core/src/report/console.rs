//! Console status lines. Everything here goes to stderr: stdout is reserved
//! for the live output-lane echo so it stays tailable.

use std::path::PathBuf;
use std::time::Duration;

use crate::model::RunConfig;

/// Print the fully resolved configuration before dispatch begins, so every
/// run is reproducible from its logged configuration line. Surfaces the
/// clamp whenever the effective prompt count is below the requested cap.
pub fn print_resolved_config(cfg: &RunConfig, requested_prompts: usize, provider: &str) {
    let strategies: Vec<&str> = cfg.strategies.iter().map(|s| s.label()).collect();
    eprintln!(
        "run config: model={} provider={} base_url={} strategies=[{}] n_prompts={} n_workers={} n_retries={} timeout_secs={} data_dir={} log_dir={} out_dir={}",
        cfg.model,
        provider,
        cfg.base_url,
        strategies.join(","),
        cfg.n_prompts,
        cfg.n_workers,
        cfg.n_retries,
        cfg.timeout_secs,
        cfg.data_dir.display(),
        cfg.log_dir.display(),
        cfg.out_dir.display(),
    );
    if cfg.n_prompts < requested_prompts {
        eprintln!(
            "note: --n-prompts {} clamped to {} (size of the smallest selected collection)",
            requested_prompts, cfg.n_prompts
        );
    }
}

/// Final summary: elapsed wall-clock plus where the artifacts landed.
pub fn print_run_footer(elapsed: Duration, artifacts: &[PathBuf]) {
    eprintln!("run finished in {:.1}s", elapsed.as_secs_f64());
    for path in artifacts {
        eprintln!("wrote {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Strategy;

    #[test]
    fn resolved_config_printing_does_not_panic_on_edge_values() {
        let cfg = RunConfig {
            model: "tei".into(),
            strategies: vec![Strategy::Base],
            n_prompts: 0,
            n_workers: 1,
            n_retries: 0,
            timeout_secs: 1,
            base_url: "http://0.0.0.0:30000/v1".into(),
            api_key: "sk".into(),
            data_dir: ".".into(),
            log_dir: "logs".into(),
            out_dir: ".".into(),
        };
        print_resolved_config(&cfg, 1000, "fake");
        print_run_footer(Duration::from_millis(1500), &[PathBuf::from("out.json")]);
    }
}
