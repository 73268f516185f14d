//! Bounded-wait execution
//!
//! The remote calls this crate makes have no upper bound of their own: a hung
//! server would block the caller forever, whatever the caller's context says.
//! [`Sentinel`] runs an operation on its own task and waits for whichever of
//! these comes first:
//!
//! * the operation finishes (its result or error is returned verbatim)
//! * the caller's [`Context`] is cancelled ([`Error::Cancelled`])
//! * the effective deadline passes ([`Error::Timeout`])
//!
//! The effective deadline is the earlier of the context deadline and the
//! sentinel's own timeout. The operation is started exactly once; the poll
//! interval only sets how often the wait re-checks cancellation and the
//! deadline.

use crate::context::Context;
use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// How a watch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    /// Operation returned a value
    Success,
    /// Operation returned an error
    Failed,
    /// Deadline passed first
    Timeout,
    /// Cancellation observed first
    Cancelled,
}

impl WatchStatus {
    fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(Error::Timeout(_)) => Self::Timeout,
            Err(Error::Cancelled) => Self::Cancelled,
            Err(_) => Self::Failed,
        }
    }

    /// Metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Result of one status poll in [`Sentinel::watch_status`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<S> {
    /// Not finished yet, poll again after the interval
    Pending,
    /// Finished with this status
    Ready(S),
}

/// Bounded-wait executor
///
/// Stateless; one value can watch any number of operations.
#[derive(Debug, Clone, Copy)]
pub struct Sentinel {
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl Sentinel {
    /// Create a sentinel
    ///
    /// `timeout` of `None` leaves only the context deadline (if any) in force.
    /// A zero poll interval is raised to 1ms.
    pub fn new(poll_interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            timeout,
        }
    }

    /// Poll interval
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Configured timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Earlier of the context deadline and `start + timeout`
    fn deadline(&self, ctx: &Context, start: Instant) -> Option<Instant> {
        let own = self.timeout.map(|t| start + t);
        match (ctx.deadline(), own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run `op` once and wait for it under the context and timeout
    ///
    /// The operation runs on a spawned task. If cancellation or the deadline
    /// wins, the task is aborted; work already sent to the server may still
    /// complete there.
    pub async fn watch<T, F>(&self, ctx: &Context, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let start = Instant::now();
        let deadline = self.deadline(ctx, start);

        let mut task = tokio::spawn(op);
        let result = self.wait(ctx, start, deadline, &mut task).await;
        if result.is_err() && !task.is_finished() {
            task.abort();
        }

        let status = WatchStatus::of(&result);
        crate::metrics::counters::sentinel_watch(status.as_str());
        tracing::debug!(
            status = status.as_str(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "sentinel watch finished"
        );
        result
    }

    /// Poll `status_fn` every interval until it reports ready, then run `on_done`
    ///
    /// The whole sequence (polls plus `on_done`) runs as a single bounded
    /// operation under the same context and timeout as [`Sentinel::watch`].
    /// Errors from `status_fn` end the watch immediately.
    pub async fn watch_status<S, T, SF, SFut, DF, DFut>(
        &self,
        ctx: &Context,
        mut status_fn: SF,
        on_done: DF,
    ) -> Result<T>
    where
        S: Send + 'static,
        T: Send + 'static,
        SF: FnMut() -> SFut + Send + 'static,
        SFut: Future<Output = Result<PollOutcome<S>>> + Send + 'static,
        DF: FnOnce(S) -> DFut + Send + 'static,
        DFut: Future<Output = Result<T>> + Send + 'static,
    {
        let interval = self.poll_interval;
        self.watch(ctx, async move {
            loop {
                match status_fn().await? {
                    PollOutcome::Ready(status) => return on_done(status).await,
                    PollOutcome::Pending => time::sleep(interval).await,
                }
            }
        })
        .await
    }

    async fn wait<T>(
        &self,
        ctx: &Context,
        start: Instant,
        deadline: Option<Instant>,
        task: &mut JoinHandle<Result<T>>,
    ) -> Result<T> {
        let timed_out = || Error::Timeout(start.elapsed());

        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let expiry = async {
            match deadline {
                Some(at) => time::sleep_until(at).await,
                None => futures::future::pending().await,
            }
        };
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                biased;

                _ = ctx.cancelled() => return Err(Error::Cancelled),

                _ = &mut expiry => return Err(timed_out()),

                joined = &mut *task => {
                    return match joined {
                        Ok(result) => result,
                        Err(e) => Err(Error::TaskFailed(e.to_string())),
                    };
                }

                _ = ticker.tick() => {
                    if ctx.is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                    if deadline.is_some_and(|at| Instant::now() >= at) {
                        return Err(timed_out());
                    }
                    tracing::trace!(
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "still waiting on watched operation"
                    );
                }
            }
        }
    }
}
