use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use clrsbench_core::dataset::{build_work_list, effective_prompt_count, load_collections};
use clrsbench_core::lanes::LaneSet;
use clrsbench_core::providers::llm::{ChatClient, OpenAiCompatClient};
use clrsbench_core::report::{console, group_outcomes, write_artifacts};
use clrsbench_core::{Dispatcher, RunConfig, Strategy};

use super::super::args::RunArgs;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS};

/// Default pool size: the remote service is the bottleneck, so oversubscribe
/// the host and keep a floor for small machines.
fn default_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4);
    (cores * 2).max(8)
}

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    // Config errors surface here, before any network call.
    let strategies = match Strategy::parse_selector(&args.datasets) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };
    let collections = match load_collections(&args.data_dir, &strategies) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {e:#}");
            return Ok(CONFIG_ERROR);
        }
    };

    let n_prompts = effective_prompt_count(args.n_prompts, &collections);
    let cfg = RunConfig {
        model: args.model,
        strategies,
        n_prompts,
        n_workers: args.n_workers.unwrap_or_else(default_workers),
        n_retries: args.n_retries,
        timeout_secs: args.timeout_secs,
        base_url: args.base_url,
        api_key: args.api_key,
        data_dir: args.data_dir,
        log_dir: args.log_dir,
        out_dir: args.out_dir,
    };

    let client: Arc<dyn ChatClient> = Arc::new(OpenAiCompatClient::new(
        cfg.model.clone(),
        cfg.base_url.clone(),
        cfg.api_key.clone(),
        8000,
    ));
    console::print_resolved_config(&cfg, args.n_prompts, client.provider_name());

    let lanes = Arc::new(LaneSet::create(&cfg.log_dir, &cfg.strategies)?);
    let units = build_work_list(&collections, cfg.n_prompts);
    eprintln!(
        "Dispatching {} prompts across {} strategies...",
        units.len(),
        cfg.strategies.len()
    );

    let started = Instant::now();
    let dispatcher = Dispatcher {
        client,
        lanes,
        n_workers: cfg.n_workers,
        n_retries: cfg.n_retries,
        timeout_secs: cfg.timeout_secs,
    };
    let outcomes = dispatcher.run_batch(units).await?;

    // Aggregation only starts once the whole batch has drained.
    let grouped = group_outcomes(&cfg.strategies, outcomes);
    let artifacts = write_artifacts(&cfg.out_dir, &cfg.model, &grouped)?;
    console::print_run_footer(started.elapsed(), &artifacts);

    Ok(SUCCESS)
}
