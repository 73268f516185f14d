//! Open a session, run one statement, close it
//!
//! Usage:
//!   DBSQL_DSN='token:<token>@<host>/<path>?catalog=main' cargo run --example connect
//!
//! Set `RUST_LOG=dbsql_wire=debug` to see the establishment spans.

use dbsql_wire::{Connector, Context, Driver};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dsn = std::env::var("DBSQL_DSN")?;
    let connector = Driver.open_connector(&dsn)?;

    let ctx = Context::background()
        .with_timeout(Duration::from_secs(120))
        .with_correlation_id("demo");

    let conn = connector.connect(&ctx).await?;
    println!("connected, session {}", conn.id());

    let result = conn.exec(&ctx, "SELECT 1").await?;
    println!("rows affected: {:?}", result.rows_affected);

    conn.close(&ctx).await?;
    Ok(())
}
