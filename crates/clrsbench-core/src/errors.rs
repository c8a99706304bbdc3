use thiserror::Error;

/// Failures of a single chat-completion attempt. All of these are transient
/// from the batch's point of view: the dispatcher retries and eventually
/// substitutes the failure sentinel, it never aborts the run for one unit.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("chat API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),
}
