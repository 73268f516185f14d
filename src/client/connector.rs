//! Connector and connection establishment
//!
//! [`SqlConnector::connect`] walks [`EstablishState`] from `Idle` to `Ready`:
//! build the RPC client, open a session under a [`Sentinel`], validate the
//! response, then replay session parameters one `SET` at a time through the
//! new connection. Every failure is terminal for the attempt; nothing is
//! retried.
//!
//! A failed parameter leaves the session open on the server with whatever
//! parameters were applied before it. The caller gets the statement's error
//! and no handle to close the session with.

use super::config::Config;
use crate::connection::{ClientFactory, Connection, EstablishState, RpcClient, WireClientFactory};
use crate::context::Context;
use crate::error::Target;
use crate::metrics::{counters, histograms};
use crate::protocol::{
    resolve_namespace, Guid, OpenSessionRequest, OpenSessionResponse, RpcRequest, RpcResponse,
    SessionHandle,
};
use crate::sentinel::Sentinel;
use crate::{Error, Result};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Driver name reported by [`Driver::name`]
pub const DRIVER_NAME: &str = "dbsql";

/// Opens connections to the SQL service
pub trait Connector: Send + Sync {
    /// Establish a new connection, bounded and cancellable by `ctx`
    fn connect<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<Connection>>;

    /// The driver this connector belongs to
    fn driver(&self) -> Driver;
}

/// Driver handle
///
/// Turns DSNs into connectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Driver;

impl Driver {
    /// Registered driver name
    pub fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    /// Build a connector from a DSN
    pub fn open_connector(&self, dsn: &str) -> Result<SqlConnector> {
        Ok(SqlConnector::new(Config::from_dsn(dsn)?))
    }
}

/// Connector for a single configured target
#[derive(Clone)]
pub struct SqlConnector {
    config: Arc<Config>,
    factory: Arc<dyn ClientFactory>,
}

impl SqlConnector {
    /// Connector using the reference wire client
    pub fn new(config: Config) -> Self {
        Self::with_client_factory(config, Arc::new(WireClientFactory))
    }

    /// Connector using a caller-supplied RPC client factory
    pub fn with_client_factory(config: Config, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
        }
    }

    /// Shared configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Establish a connection
    pub async fn establish(&self, ctx: &Context) -> Result<Connection> {
        let target = self.config.target();
        let started = Instant::now();
        counters::connect_attempted();

        let span = tracing::info_span!(
            "connect",
            host = %target.host,
            port = target.port,
            path = %target.path,
            correlation_id = ctx.correlation_id().unwrap_or(""),
            conn_id = tracing::field::Empty,
        );

        let mut state = EstablishState::Idle;
        let result = self
            .run(ctx, &target, &mut state)
            .instrument(span.clone())
            .await;

        histograms::connect_duration(started.elapsed().as_millis() as u64);
        span.in_scope(|| match &result {
            Ok(conn) => {
                counters::connect_succeeded();
                tracing::info!(conn_id = %conn.id(), "connection established");
            }
            Err(e) => {
                counters::connect_failed(state.stage(), e.category());
                tracing::warn!(state = %state, error = %e, "connection failed");
            }
        });
        result
    }

    async fn run(
        &self,
        ctx: &Context,
        target: &Target,
        state: &mut EstablishState,
    ) -> Result<Connection> {
        state.transition(EstablishState::ClientInitializing)?;
        let client = self
            .factory
            .init(&self.config)
            .map_err(|e| Error::client_init(target.clone(), e))?;

        state.transition(EstablishState::SessionOpening)?;
        let response = self.open_session(ctx, target, &client).await?;

        state.transition(EstablishState::ResponseValidating)?;
        let (guid, handle) = validate_open_session(target, response)?;
        let conn = Connection::new(
            guid.session_id(),
            handle,
            Arc::clone(&self.config),
            client,
        );
        tracing::Span::current().record("conn_id", tracing::field::display(conn.id()));
        tracing::debug!("session opened");

        state.transition(EstablishState::ParameterApplying)?;
        for (key, value) in &self.config.session_params {
            conn.exec(ctx, &session_param_statement(key, value)).await?;
            counters::session_param_applied();
            tracing::debug!(key = %key, "set session parameter");
        }

        state.transition(EstablishState::Ready)?;
        Ok(conn)
    }

    async fn open_session(
        &self,
        ctx: &Context,
        target: &Target,
        client: &Arc<dyn RpcClient>,
    ) -> Result<RpcResponse> {
        let request = RpcRequest::OpenSession(open_session_request(&self.config));
        let sentinel = Sentinel::new(self.config.poll_interval, self.config.default_timeout);
        let client = Arc::clone(client);

        let started = Instant::now();
        let result = sentinel
            .watch(ctx, async move { client.call(request).await })
            .await;
        histograms::session_open_duration(started.elapsed().as_millis() as u64);

        match result {
            Ok(RpcResponse::OpenSession(resp)) if !resp.status.is_success() => Err(
                Error::session_open(target.clone(), Error::Remote(resp.status)),
            ),
            Ok(response) => Ok(response),
            Err(e) => Err(Error::session_open(target.clone(), e)),
        }
    }
}

impl Connector for SqlConnector {
    fn connect<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<Connection>> {
        self.establish(ctx).boxed()
    }

    fn driver(&self) -> Driver {
        Driver
    }
}

impl std::fmt::Debug for SqlConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlConnector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Open-session request for `config`
///
/// The server-side configuration map is always sent empty; session
/// parameters are applied afterwards with `SET`.
pub fn open_session_request(config: &Config) -> OpenSessionRequest {
    OpenSessionRequest {
        client_protocol: config.protocol_version,
        configuration: HashMap::new(),
        initial_namespace: Some(resolve_namespace(&config.catalog, &config.schema)),
        can_use_multiple_catalogs: Some(config.can_use_multiple_catalogs),
    }
}

/// `SET` statement applying one session parameter
///
/// Key and value are wrapped in backticks and not escaped: a backtick inside
/// either one produces a malformed statement.
pub fn session_param_statement(key: &str, value: &str) -> String {
    format!("SET `{}` = `{}`;", key, value)
}

fn validate_open_session(
    target: &Target,
    response: RpcResponse,
) -> Result<(Guid, SessionHandle)> {
    let invalid = |reason: String| Error::InvalidResponse {
        target: target.clone(),
        reason,
    };

    // A failure status was already turned into a session-open error
    let OpenSessionResponse { session_handle, .. } = match response {
        RpcResponse::OpenSession(resp) => resp,
        other => {
            return Err(invalid(format!(
                "expected open_session response, got {}",
                other.method()
            )))
        }
    };

    let handle = session_handle.ok_or_else(|| invalid("missing session handle".into()))?;
    let guid = Guid::try_from(handle.session_id.guid.as_slice())
        .map_err(|e| invalid(e.to_string()))?;

    Ok((guid, handle))
}
