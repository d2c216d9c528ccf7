//! Request-scoped deadline and cancellation
//!
//! Every async trait method receives a Context as its first parameter. API
//! clients consult it to abandon work once the host's deadline passes or the
//! operation is cancelled.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Context carries the deadline and cancellation signal of one host call
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    cancel: Arc<watch::Sender<bool>>,
}

impl Context {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                cancel: Arc::new(cancel),
            }),
        }
    }

    /// Derive a context that expires after `timeout`, sharing the parent's
    /// cancellation. An earlier parent deadline wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(self, deadline: Instant) -> Self {
        let deadline = match self.inner.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                cancel: self.inner.cancel.clone(),
            }),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    pub fn deadline_exceeded(&self) -> bool {
        self.inner
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancel.borrow() || self.deadline_exceeded()
    }

    pub fn cancel(&self) {
        self.inner.cancel.send_replace(true);
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        let mut cancel = self.inner.cancel.subscribe();
        let cancelled = async move {
            let _ = cancel.wait_for(|cancelled| *cancelled).await;
        };

        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = cancelled => {}
                    _ = time::sleep_until(deadline.into()) => {}
                }
            }
            None => cancelled.await,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
