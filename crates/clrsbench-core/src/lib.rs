//! Core engine for clrsbench: loads per-strategy prompt collections, fans them
//! out to an OpenAI-compatible chat endpoint under a bounded worker pool, and
//! regroups the responses into per-strategy artifacts for downstream scoring.

pub mod dataset;
pub mod engine;
pub mod errors;
pub mod lanes;
pub mod model;
pub mod providers;
pub mod report;

pub use engine::dispatcher::Dispatcher;
pub use model::{BenchmarkRecord, DispatchOutcome, ResponseRecord, RunConfig, Strategy, WorkItem};
