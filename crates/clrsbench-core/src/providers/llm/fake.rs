use super::ChatClient;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted client for engine tests: succeeds with a fixed reply after an
/// optional number of leading failures, or fails on every call.
pub struct FakeClient {
    reply: String,
    fail_first: usize,
    always_fail: bool,
    calls: AtomicUsize,
}

impl FakeClient {
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail_first: 0,
            always_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self {
            reply: String::new(),
            fail_first: 0,
            always_fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_then_ok(failures: usize, reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail_first: failures,
            always_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Total calls observed, across all units and attempts.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for FakeClient {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.always_fail || n < self.fail_first {
            anyhow::bail!("scripted provider error (call {})", n + 1);
        }
        Ok(self.reply.clone())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
