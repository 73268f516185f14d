//! Histogram metrics

/// Time spent in the open-session call, in milliseconds
pub fn session_open_duration(duration_ms: u64) {
    metrics::histogram!("dbsql_wire_session_open_duration_ms").record(duration_ms as f64);
}

/// Time for the whole establishment, in milliseconds
pub fn connect_duration(duration_ms: u64) {
    metrics::histogram!("dbsql_wire_connect_duration_ms").record(duration_ms as f64);
}
