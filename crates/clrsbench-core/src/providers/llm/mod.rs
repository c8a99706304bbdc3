//! Chat-completion clients. The engine only sees the `ChatClient` seam; the
//! real client targets an OpenAI-compatible endpoint, the fake one scripts
//! successes and failures for tests.

pub mod fake;
pub mod openai;

use async_trait::async_trait;

pub use fake::FakeClient;
pub use openai::OpenAiCompatClient;

/// One request/response exchange with the inference service. Implementations
/// must be safe to share across worker tasks.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one prompt and return the reply text. Errors are transient by
    /// contract; the dispatcher owns the retry budget.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;

    fn provider_name(&self) -> &'static str;
}
