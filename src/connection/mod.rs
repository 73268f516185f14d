//! Connection management
//!
//! This module handles:
//! * The RPC client seam and the reference TCP/TLS wire client
//! * Establishment state machine enforcement
//! * The open-session handle and statement execution on it
//! * TLS configuration

mod client;
mod conn;
mod state;
mod tls;
mod transport;

pub use client::{ClientFactory, RpcClient, WireClient, WireClientFactory};
pub use conn::{Connection, ExecResult};
pub use state::EstablishState;
pub use tls::{parse_server_name, TlsConfig, TlsConfigBuilder};
pub use transport::Transport;
