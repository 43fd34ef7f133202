//! Process-wide cooperative cancellation token (§4.2).
//!
//! A single token is constructed by the engine and threaded into every
//! suspension point: the scheduled-start wait, the inter-cycle wait, and
//! the inter-step waits inside the Clear Protocol. Cancellation is a
//! monotonic one-way transition — the first reason wins and every later
//! `cancel()` call is a no-op.
//!
//! Wraps `tokio_util::sync::CancellationToken` for the actual signal
//! (the same primitive the teacher's `agtmux-daemon` and
//! `agtmux-runtime::poll_loop` race against in their own shutdown paths)
//! and layers the spec's `reason`/`timestamp` bookkeeping on top. `sleep`
//! is a `select!` race against `token.cancelled()` rather than a manual
//! poll loop, so cancellation is observed immediately instead of at the
//! next polling tick.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationInfo {
    pub reason: String,
    pub at: DateTime<Utc>,
}

struct Inner {
    token: tokio_util::sync::CancellationToken,
    info: Option<CancellationInfo>,
}

#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Mutex<Inner>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                token: tokio_util::sync::CancellationToken::new(),
                info: None,
            })),
        }
    }

    /// Idempotent: only the first reason/timestamp is retained.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut guard = self.inner.lock().expect("cancellation token mutex poisoned");
        if guard.info.is_none() {
            guard.info = Some(CancellationInfo {
                reason: reason.into(),
                at: Utc::now(),
            });
            guard.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner
            .lock()
            .expect("cancellation token mutex poisoned")
            .token
            .is_cancelled()
    }

    pub fn reason(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("cancellation token mutex poisoned")
            .info
            .as_ref()
            .map(|info| info.reason.clone())
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.inner
            .lock()
            .expect("cancellation token mutex poisoned")
            .info
            .as_ref()
            .map(|info| info.at)
    }

    /// Preemptible wait: races `tokio_util`'s `cancelled()` future against
    /// a plain timer and returns `true` the instant cancellation fires,
    /// otherwise `false` once `duration` has elapsed.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let inner_token = self
            .inner
            .lock()
            .expect("cancellation token mutex poisoned")
            .token
            .clone();
        tokio::select! {
            _ = inner_token.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }

    /// Tests only: rewind a cancelled token back to live.
    #[cfg(test)]
    pub fn reset(&self) {
        let mut guard = self.inner.lock().expect("cancellation token mutex poisoned");
        guard.token = tokio_util::sync::CancellationToken::new();
        guard.info = None;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
