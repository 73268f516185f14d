//! Core connection type

use super::client::RpcClient;
use crate::client::Config;
use crate::context::Context;
use crate::protocol::{
    CloseSessionRequest, ExecuteStatementRequest, RpcRequest, RpcResponse, SessionHandle,
    SessionId,
};
use crate::sentinel::Sentinel;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::Instrument;

/// Outcome of a statement run through [`Connection::exec`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows affected, when the server reports it
    pub rows_affected: Option<i64>,
}

/// An open session
///
/// Produced only by a fully successful establishment. Owns its session
/// handle; shares configuration and the RPC client with the connector that
/// created it. Meant for one caller at a time.
pub struct Connection {
    id: SessionId,
    handle: SessionHandle,
    config: Arc<Config>,
    client: Arc<dyn RpcClient>,
    sentinel: Sentinel,
}

impl Connection {
    pub(crate) fn new(
        id: SessionId,
        handle: SessionHandle,
        config: Arc<Config>,
        client: Arc<dyn RpcClient>,
    ) -> Self {
        let sentinel = Sentinel::new(config.poll_interval, config.default_timeout);
        Self {
            id,
            handle,
            config,
            client,
            sentinel,
        }
    }

    /// Rendered session identity, for logs and diagnostics
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Server-issued session handle
    pub fn session_handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Configuration this connection was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute one statement in this session
    ///
    /// The call is bounded by the connection's poll interval and default
    /// timeout, and by `ctx`. A failure status from the server becomes
    /// [`Error::Sql`].
    pub async fn exec(&self, ctx: &Context, sql: &str) -> Result<ExecResult> {
        let request = RpcRequest::ExecuteStatement(ExecuteStatementRequest {
            session_handle: self.handle.clone(),
            statement: sql.to_string(),
            query_timeout: self
                .config
                .query_timeout
                .map(|t| t.as_secs())
                .unwrap_or(0),
        });

        let response = self
            .call(ctx, request)
            .instrument(tracing::debug_span!("exec", conn_id = %self.id))
            .await
            .map_err(|e| match e {
                Error::Remote(status) => Error::Sql(status.to_string()),
                other => other,
            })?;

        match response {
            RpcResponse::ExecuteStatement(resp) if resp.status.is_success() => Ok(ExecResult {
                rows_affected: resp.rows_affected,
            }),
            RpcResponse::ExecuteStatement(resp) => Err(Error::Sql(resp.status.to_string())),
            other => Err(Error::Protocol(format!(
                "expected execute_statement response, got {}",
                other.method()
            ))),
        }
    }

    /// Close the session on the server
    pub async fn close(self, ctx: &Context) -> Result<()> {
        let request = RpcRequest::CloseSession(CloseSessionRequest {
            session_handle: self.handle.clone(),
        });

        let response = self.call(ctx, request).await?;
        match response {
            RpcResponse::CloseSession(resp) if resp.status.is_success() => {
                tracing::debug!(conn_id = %self.id, "session closed");
                Ok(())
            }
            RpcResponse::CloseSession(resp) => Err(Error::Remote(resp.status)),
            other => Err(Error::Protocol(format!(
                "expected close_session response, got {}",
                other.method()
            ))),
        }
    }

    async fn call(&self, ctx: &Context, request: RpcRequest) -> Result<RpcResponse> {
        let client = Arc::clone(&self.client);
        self.sentinel
            .watch(ctx, async move { client.call(request).await })
            .await
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("host", &self.config.host)
            .field("rpc_path", &self.config.rpc_path)
            .finish()
    }
}
