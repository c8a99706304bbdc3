//! The concurrent dispatch engine. A fixed pool of permits bounds how many
//! units are in flight; each unit runs its full attempt loop end-to-end and
//! always produces exactly one outcome, so the batch completes in bounded
//! time regardless of remote-service reliability.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};

use crate::engine::FAILED_RESPONSE;
use crate::errors::ProviderError;
use crate::lanes::LaneSet;
use crate::model::{BenchmarkRecord, DispatchOutcome, ResponseRecord, WorkItem};
use crate::providers::llm::ChatClient;

pub struct Dispatcher {
    pub client: Arc<dyn ChatClient>,
    pub lanes: Arc<LaneSet>,
    pub n_workers: usize,
    pub n_retries: u32,
    pub timeout_secs: u64,
}

impl Dispatcher {
    /// Drain the combined work list. At most `n_workers` units hold a permit
    /// at once; completion order is nondeterministic and carries no meaning.
    /// Returns one outcome per submitted unit, in completion order.
    pub async fn run_batch(
        &self,
        units: Vec<(WorkItem, BenchmarkRecord)>,
    ) -> anyhow::Result<Vec<DispatchOutcome>> {
        let total = units.len();
        let sem = Arc::new(Semaphore::new(self.n_workers.max(1)));
        let mut join_set = JoinSet::new();

        // Enough to rebuild a sentinel outcome if a worker task dies without
        // returning one. Keyed by task id; drained as tasks complete.
        let mut in_flight: HashMap<tokio::task::Id, (WorkItem, ResponseRecord)> = HashMap::new();

        for (item, record) in units {
            let permit = sem.clone().acquire_owned().await?;
            let client = self.client.clone();
            let lanes = self.lanes.clone();
            let n_retries = self.n_retries;
            let timeout_secs = self.timeout_secs;

            let fallback = ResponseRecord {
                category: record.category.clone(),
                question: record.question.clone(),
                answer: record.answer.clone(),
                model_output: FAILED_RESPONSE.to_string(),
            };
            let handle = join_set.spawn(async move {
                let _permit = permit;
                Self::run_unit(client, lanes, item, record, n_retries, timeout_secs).await
            });
            in_flight.insert(handle.id(), (item, fallback));
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(res) = join_set.join_next_with_id().await {
            match res {
                Ok((id, outcome)) => {
                    in_flight.remove(&id);
                    outcomes.push(outcome);
                }
                Err(join_err) => {
                    // A worker died (panic/abort). The unit still owes the
                    // batch exactly one outcome.
                    if let Some((item, fallback)) = in_flight.remove(&join_err.id()) {
                        eprintln!(
                            "WARNING: worker for [{}/{}] died: {}",
                            item.index, item.strategy, join_err
                        );
                        self.lanes.log_output(item, FAILED_RESPONSE);
                        outcomes.push(DispatchOutcome {
                            strategy: item.strategy,
                            record: fallback,
                        });
                    }
                }
            }
        }
        Ok(outcomes)
    }

    /// One unit end-to-end: bounded attempt loop, per-attempt error logging,
    /// one output-lane entry for the final content.
    async fn run_unit(
        client: Arc<dyn ChatClient>,
        lanes: Arc<LaneSet>,
        item: WorkItem,
        record: BenchmarkRecord,
        n_retries: u32,
        timeout_secs: u64,
    ) -> DispatchOutcome {
        let mut reply = None;
        for attempt in 0..=n_retries {
            match Self::attempt(client.as_ref(), &record.prompt, timeout_secs).await {
                Ok(text) => {
                    reply = Some(text);
                    break;
                }
                Err(e) => {
                    let retries_left = n_retries - attempt;
                    tracing::debug!(
                        index = item.index,
                        strategy = item.strategy.label(),
                        retries_left,
                        "attempt failed: {e:#}"
                    );
                    lanes.log_error(item, retries_left, &format!("{e:#}"));
                }
            }
        }
        let model_output = reply.unwrap_or_else(|| FAILED_RESPONSE.to_string());
        lanes.log_output(item, &model_output);

        DispatchOutcome {
            strategy: item.strategy,
            record: ResponseRecord {
                category: record.category,
                question: record.question,
                answer: record.answer,
                model_output,
            },
        }
    }

    /// A hung call must not starve a worker slot, so every attempt is bounded
    /// by the configured network timeout.
    async fn attempt(
        client: &dyn ChatClient,
        prompt: &str,
        timeout_secs: u64,
    ) -> anyhow::Result<String> {
        match timeout(Duration::from_secs(timeout_secs), client.complete(prompt)).await {
            Ok(res) => res,
            Err(_) => Err(ProviderError::Timeout(timeout_secs).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::build_work_list;
    use crate::model::Strategy;
    use crate::providers::llm::FakeClient;

    fn record(question: &str) -> BenchmarkRecord {
        BenchmarkRecord {
            category: "graphs".into(),
            algorithm: "bfs".into(),
            question: question.into(),
            answer: "0 1 2".into(),
            prompt: format!("trace: {}", question),
        }
    }

    fn collections(strategies: &[Strategy], n: usize) -> Vec<(Strategy, Vec<BenchmarkRecord>)> {
        strategies
            .iter()
            .map(|&s| {
                let records = (0..n)
                    .map(|i| record(&format!("{}-q{}", s.label(), i)))
                    .collect();
                (s, records)
            })
            .collect()
    }

    struct Harness {
        dispatcher: Dispatcher,
        client: Arc<FakeClient>,
        lanes: Arc<LaneSet>,
        _dir: tempfile::TempDir,
    }

    fn harness(client: FakeClient, strategies: &[Strategy], n_workers: usize, n_retries: u32) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let lanes = Arc::new(LaneSet::create(dir.path(), strategies).unwrap());
        let client = Arc::new(client);
        let dispatcher = Dispatcher {
            client: client.clone(),
            lanes: lanes.clone(),
            n_workers,
            n_retries,
            timeout_secs: 5,
        };
        Harness {
            dispatcher,
            client,
            lanes,
            _dir: dir,
        }
    }

    fn log_lines(lanes: &LaneSet, strategy: Strategy, errors: bool) -> Vec<String> {
        let path = if errors {
            lanes.error_log_path(strategy).unwrap()
        } else {
            lanes.output_log_path(strategy).unwrap()
        };
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn happy_path_yields_one_outcome_per_unit() {
        let strategies = [Strategy::Base, Strategy::Cot];
        let h = harness(FakeClient::ok("<answer>42</answer>"), &strategies, 4, 0);
        let units = build_work_list(&collections(&strategies, 3), 3);

        let outcomes = h.dispatcher.run_batch(units).await.unwrap();

        assert_eq!(outcomes.len(), 6);
        for strategy in strategies {
            let n = outcomes.iter().filter(|o| o.strategy == strategy).count();
            assert_eq!(n, 3);
        }
        assert!(outcomes
            .iter()
            .all(|o| o.record.model_output == "<answer>42</answer>"));
        assert_eq!(h.client.calls(), 6);
        assert_eq!(log_lines(&h.lanes, Strategy::Base, false).len(), 3);
        assert_eq!(log_lines(&h.lanes, Strategy::Base, true).len(), 0);
    }

    #[tokio::test]
    async fn exhausted_retries_yield_sentinel_and_full_error_trail() {
        let h = harness(FakeClient::always_failing(), &[Strategy::React], 2, 2);
        let units = build_work_list(&collections(&[Strategy::React], 1), 1);

        let outcomes = h.dispatcher.run_batch(units).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].record.model_output, FAILED_RESPONSE);
        // retry budget 2 => exactly 3 attempts, one error entry each
        assert_eq!(h.client.calls(), 3);
        let errors = log_lines(&h.lanes, Strategy::React, true);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("(2 retries left)"));
        assert!(errors[1].contains("(1 retries left)"));
        assert!(errors[2].contains("(0 retries left)"));
        let output = log_lines(&h.lanes, Strategy::React, false);
        assert_eq!(output.len(), 1);
        assert!(output[0].contains(FAILED_RESPONSE));
    }

    #[tokio::test]
    async fn early_success_stops_the_attempt_loop() {
        let h = harness(FakeClient::fail_then_ok(2, "<answer>7</answer>"), &[Strategy::Scope], 1, 2);
        let units = build_work_list(&collections(&[Strategy::Scope], 1), 1);

        let outcomes = h.dispatcher.run_batch(units).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].record.model_output, "<answer>7</answer>");
        assert_eq!(h.client.calls(), 3);
        assert_eq!(log_lines(&h.lanes, Strategy::Scope, true).len(), 2);
        assert_eq!(log_lines(&h.lanes, Strategy::Scope, false).len(), 1);
    }

    #[tokio::test]
    async fn generous_retry_budget_does_not_inflate_successful_units() {
        let h = harness(FakeClient::ok("<answer>1</answer>"), &[Strategy::Base], 1, 5);
        let units = build_work_list(&collections(&[Strategy::Base], 1), 1);

        h.dispatcher.run_batch(units).await.unwrap();
        assert_eq!(h.client.calls(), 1);
    }

    #[tokio::test]
    async fn large_batch_is_complete_with_no_drops_or_duplicates() {
        let strategies = [Strategy::Base, Strategy::React, Strategy::Cot];
        let h = harness(FakeClient::ok("<answer>ok</answer>"), &strategies, 3, 0);
        let units = build_work_list(&collections(&strategies, 25), 25);
        let submitted: Vec<String> = units.iter().map(|(_, r)| r.question.clone()).collect();

        let outcomes = h.dispatcher.run_batch(units).await.unwrap();

        assert_eq!(outcomes.len(), 75);
        let mut returned: Vec<String> =
            outcomes.iter().map(|o| o.record.question.clone()).collect();
        let mut expected = submitted;
        returned.sort();
        expected.sort();
        assert_eq!(returned, expected);
    }

    #[tokio::test]
    async fn single_worker_pool_still_drains_everything() {
        let h = harness(FakeClient::ok("<answer>ok</answer>"), &[Strategy::Base], 1, 0);
        let units = build_work_list(&collections(&[Strategy::Base], 10), 10);

        let outcomes = h.dispatcher.run_batch(units).await.unwrap();
        assert_eq!(outcomes.len(), 10);
    }
}
