//! Connector-level API
//!
//! Configuration, DSN parsing and the connector that establishes sessions.

mod config;
mod connection_string;
mod connector;

pub use config::{
    Config, ConfigBuilder, DEFAULT_MAX_ROWS, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT,
};
pub use connection_string::ConnectionInfo;
pub use connector::{
    open_session_request, session_param_statement, Connector, Driver, SqlConnector, DRIVER_NAME,
};
