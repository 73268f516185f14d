//! Counter metrics

/// Connection establishment started
pub fn connect_attempted() {
    metrics::counter!("dbsql_wire_connect_attempts_total").increment(1);
}

/// Connection establishment returned a connection
pub fn connect_succeeded() {
    metrics::counter!("dbsql_wire_connect_success_total").increment(1);
}

/// Connection establishment failed at `stage`
pub fn connect_failed(stage: &'static str, category: &'static str) {
    metrics::counter!(
        "dbsql_wire_connect_failures_total",
        "stage" => stage,
        "category" => category
    )
    .increment(1);
}

/// A session parameter was applied
pub fn session_param_applied() {
    metrics::counter!("dbsql_wire_session_params_applied_total").increment(1);
}

/// A sentinel watch ended with `status`
pub fn sentinel_watch(status: &'static str) {
    metrics::counter!("dbsql_wire_sentinel_watches_total", "status" => status).increment(1);
}
