//! Caller context: cancellation, deadline and correlation id
//!
//! A [`Context`] travels with every bounded call. Cancellation is cooperative:
//! it is observed by [`crate::sentinel::Sentinel`] while it waits, never inside
//! the remote call itself.

use futures::future::{self, FutureExt};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation/deadline carrier for a single call chain
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Vec<watch::Receiver<bool>>,
    correlation_id: Option<String>,
}

impl Context {
    /// Context with no deadline and no cancellation
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context whose deadline is at most `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context whose deadline is at most `deadline`
    ///
    /// An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a cancellable context
    ///
    /// Cancelling the returned handle cancels this context and every context
    /// cloned from it afterwards. Parent cancellation still applies.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel.push(rx);
        (self, CancelHandle { tx })
    }

    /// Attach a correlation id for log correlation
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Effective deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Correlation id, if any
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Whether cancellation has been signalled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.iter().any(|rx| *rx.borrow())
    }

    /// Resolves once cancellation is signalled
    ///
    /// Never resolves for a context without a live cancel handle.
    pub async fn cancelled(&self) {
        if self.cancel.is_empty() {
            return future::pending().await;
        }
        let waits = self
            .cancel
            .iter()
            .cloned()
            .map(|rx| wait_cancelled(rx).boxed());
        future::select_all(waits).await;
    }
}

async fn wait_cancelled(mut rx: watch::Receiver<bool>) {
    // A dropped handle can no longer cancel
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        future::pending::<()>().await;
    }
}

/// Signals cancellation to a [`Context`]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the associated context
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
