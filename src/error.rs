//! Error types for dbsql-wire

use crate::protocol::Status;
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Connection target a failure is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Server hostname
    pub host: String,
    /// Server port
    pub port: u16,
    /// RPC endpoint path
    pub path: String,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host={} port={} path={}", self.host, self.port, self.path)
    }
}

/// Why opening a session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOpenCause {
    /// The bounded wait expired first
    Timeout,
    /// The caller cancelled first
    Cancelled,
    /// The open-session call itself reported failure
    Remote,
}

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// The RPC client could not be constructed
    #[error("error initializing rpc client: {target}")]
    ClientInit {
        /// Connection target
        target: Target,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },

    /// The open-session call failed, timed out or was cancelled
    #[error("error connecting: {target}")]
    SessionOpen {
        /// Connection target
        target: Target,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },

    /// Response present but not the expected open-session shape
    #[error("invalid open session response ({target}): {reason}")]
    InvalidResponse {
        /// Connection target
        target: Target,
        /// What was wrong with the response
        reason: String,
    },

    /// Bounded wait expired
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Caller cancellation observed
    #[error("operation cancelled")]
    Cancelled,

    /// Server reported a failure status
    #[error("remote error: {0}")]
    Remote(Status),

    /// Statement execution failed on the server
    #[error("sql error: {0}")]
    Sql(String),

    /// Watched task panicked or was aborted
    #[error("watched task failed: {0}")]
    TaskFailed(String),

    /// State machine transition not allowed
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Protocol violation on the wire
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Server closed the connection
    #[error("connection closed")]
    ConnectionClosed,

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Frame serialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a client construction failure with its target
    pub fn client_init(target: Target, source: Error) -> Self {
        Error::ClientInit {
            target,
            source: Box::new(source),
        }
    }

    /// Wrap an open-session failure with its target
    pub fn session_open(target: Target, source: Error) -> Self {
        Error::SessionOpen {
            target,
            source: Box::new(source),
        }
    }

    /// Connection target this error is attributed to, if any
    pub fn target(&self) -> Option<&Target> {
        match self {
            Error::ClientInit { target, .. }
            | Error::SessionOpen { target, .. }
            | Error::InvalidResponse { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Classify a session-open failure
    pub fn session_open_cause(&self) -> Option<SessionOpenCause> {
        match self {
            Error::SessionOpen { source, .. } => Some(match source.as_ref() {
                Error::Timeout(_) => SessionOpenCause::Timeout,
                Error::Cancelled => SessionOpenCause::Cancelled,
                _ => SessionOpenCause::Remote,
            }),
            _ => None,
        }
    }

    /// Whether a bounded wait expired, directly or as the wrapped cause
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::SessionOpen { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Whether caller cancellation was observed, directly or as the wrapped cause
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::SessionOpen { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Stable label for metrics
    pub fn category(&self) -> &'static str {
        match self {
            Error::ClientInit { .. } => "client_init",
            Error::SessionOpen { .. } => "session_open",
            Error::InvalidResponse { .. } => "invalid_response",
            Error::Timeout(_) => "timeout",
            Error::Cancelled => "cancelled",
            Error::Remote(_) => "remote",
            Error::Sql(_) => "sql",
            Error::TaskFailed(_) => "task_failed",
            Error::InvalidState { .. } => "invalid_state",
            Error::Config(_) => "config",
            Error::Protocol(_) => "protocol",
            Error::ConnectionClosed => "connection_closed",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
