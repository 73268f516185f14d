//! Integration tests for dbsql-wire
//!
//! These tests require a reachable SQL endpoint. Set `DBSQL_DSN` to a DSN of
//! the form `token:<token>@<host>[:<port>]/<path>?catalog=..&schema=..`.
//!
//! Run with: cargo test --test integration -- --ignored --nocapture

use dbsql_wire::{Connector, Context, Driver};
use std::time::Duration;

fn dsn() -> String {
    std::env::var("DBSQL_DSN").expect("DBSQL_DSN must be set for integration tests")
}

/// Append one query parameter to `dsn`, starting the query if there is none
fn with_param(dsn: &str, param: &str) -> String {
    let sep = if dsn.contains('?') { '&' } else { '?' };
    format!("{}{}{}", dsn, sep, param)
}

#[test]
fn test_with_param_picks_separator() {
    assert_eq!(
        with_param("token:t@h/sql/1.0", "timezone=UTC"),
        "token:t@h/sql/1.0?timezone=UTC"
    );
    assert_eq!(
        with_param("token:t@h/sql/1.0?catalog=main", "timezone=UTC"),
        "token:t@h/sql/1.0?catalog=main&timezone=UTC"
    );

    let config = dbsql_wire::Config::from_dsn(&with_param("token:t@h/sql/1.0", "timezone=UTC"))
        .expect("dsn");
    assert_eq!(config.rpc_path, "/sql/1.0");
    assert_eq!(
        config.session_params.get("timezone").map(String::as_str),
        Some("UTC")
    );
}

#[tokio::test]
#[ignore] // Requires a live endpoint
async fn test_connect_and_query() {
    let connector = Driver.open_connector(&dsn()).expect("dsn");
    let ctx = Context::background().with_timeout(Duration::from_secs(60));

    let conn = connector.connect(&ctx).await.expect("connect");
    println!("session {}", conn.id());

    conn.exec(&ctx, "SELECT 1").await.expect("query");
    conn.close(&ctx).await.expect("close");
}

#[tokio::test]
#[ignore] // Requires a live endpoint
async fn test_session_params_applied() {
    let dsn = with_param(&dsn(), "timezone=UTC");
    let connector = Driver.open_connector(&dsn).expect("dsn");
    let ctx = Context::background().with_timeout(Duration::from_secs(60));

    let conn = connector.connect(&ctx).await.expect("connect");
    conn.close(&ctx).await.expect("close");
}

#[tokio::test]
#[ignore] // Requires a live endpoint
async fn test_bad_session_param_fails_connect() {
    let dsn = with_param(&dsn(), "no_such_parameter_xyz=1");
    let connector = Driver.open_connector(&dsn).expect("dsn");
    let ctx = Context::background().with_timeout(Duration::from_secs(60));

    let err = connector.connect(&ctx).await.unwrap_err();
    println!("expected failure: {}", err);
}
