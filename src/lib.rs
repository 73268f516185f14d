//! # dbsql-wire
//!
//! Connection establishment for a SQL service reached over a session-oriented
//! RPC protocol.
//!
//! Opening a session is a remote call with no upper bound of its own. This
//! crate runs it under a [`Sentinel`], which waits for the call, the caller's
//! cancellation or a deadline (whichever comes first), then replays the
//! configured session parameters as `SET` statements before handing back a
//! [`Connection`].
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> dbsql_wire::Result<()> {
//! use dbsql_wire::{Config, Connector, Context, SqlConnector};
//! use std::time::Duration;
//!
//! let config = Config::builder()
//!     .server_hostname("example.cloud.local")
//!     .rpc_path("/sql/1.0/warehouses/abc")
//!     .access_token("secret")
//!     .initial_namespace("main", "default")
//!     .session_param("timezone", "UTC")
//!     .build();
//!
//! let connector = SqlConnector::new(config);
//! let ctx = Context::background().with_timeout(Duration::from_secs(30));
//! let conn = connector.connect(&ctx).await?;
//!
//! conn.exec(&ctx, "SELECT 1").await?;
//! conn.close(&ctx).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod connection;
pub mod context;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod sentinel;

pub use client::{Config, ConfigBuilder, Connector, Driver, SqlConnector};
pub use connection::{ClientFactory, Connection, ExecResult, RpcClient};
pub use context::{CancelHandle, Context};
pub use error::{Error, Result, SessionOpenCause, Target};
pub use sentinel::{PollOutcome, Sentinel, WatchStatus};
