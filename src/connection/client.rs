//! RPC client seam and the reference wire client
//!
//! [`RpcClient`] is the one thing establishment needs from the transport:
//! send a request, get a response. [`WireClient`] implements it with
//! length-prefixed JSON frames over TCP (TLS by default), connecting lazily on
//! the first call so that the dial happens inside the bounded open-session
//! wait.

use super::tls::{parse_server_name, TlsConfig};
use super::transport::Transport;
use crate::client::Config;
use crate::protocol::{decode_frame, encode_frame, RequestEnvelope, RpcRequest, RpcResponse};
use crate::{Error, Result};
use bytes::BytesMut;
use futures::future::{BoxFuture, FutureExt};
use std::io;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;

/// A client able to make session RPCs
pub trait RpcClient: Send + Sync {
    /// Send one request and wait for its response
    ///
    /// A call-level failure reported by the server comes back as
    /// [`Error::Remote`].
    fn call(&self, request: RpcRequest) -> BoxFuture<'_, Result<RpcResponse>>;
}

/// Builds the RPC client for a connection attempt
pub trait ClientFactory: Send + Sync {
    /// Construct a client from transport settings
    fn init(&self, config: &Config) -> Result<Arc<dyn RpcClient>>;
}

/// Factory for [`WireClient`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WireClientFactory;

impl ClientFactory for WireClientFactory {
    fn init(&self, config: &Config) -> Result<Arc<dyn RpcClient>> {
        Ok(Arc::new(WireClient::new(config)?))
    }
}

/// Length-prefixed JSON RPC client over TCP/TLS
///
/// One call in flight at a time. A transport that fails or is abandoned
/// mid-call is dropped and redialed on the next call.
pub struct WireClient {
    host: String,
    port: u16,
    path: String,
    token: Option<String>,
    user_agent: String,
    tls: Option<TlsConfig>,
    transport: Mutex<Option<Transport>>,
}

impl WireClient {
    /// Validate transport settings and build the client (does not dial)
    pub fn new(config: &Config) -> Result<Self> {
        if config.host.is_empty() {
            return Err(Error::Config("server hostname is required".into()));
        }
        if config.port == 0 {
            return Err(Error::Config("port must be non-zero".into()));
        }

        let tls = if config.use_tls {
            parse_server_name(&config.host)?;
            Some(match &config.tls {
                Some(tls) => tls.clone(),
                None => TlsConfig::builder().build()?,
            })
        } else {
            None
        };

        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            path: config.rpc_path.clone(),
            token: config.access_token.clone(),
            user_agent: config.user_agent(),
            tls,
            transport: Mutex::new(None),
        })
    }

    /// Whether the transport is TLS
    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }

    async fn dial(&self) -> Result<Transport> {
        tracing::debug!(host = %self.host, port = self.port, tls = self.is_tls(), "dialing");
        match &self.tls {
            Some(tls) => Transport::connect_tcp_tls(&self.host, self.port, tls).await,
            None => Transport::connect_tcp(&self.host, self.port).await,
        }
    }

    async fn round_trip(&self, request: RpcRequest) -> Result<RpcResponse> {
        let envelope = RequestEnvelope {
            path: self.path.clone(),
            token: self.token.clone(),
            user_agent: self.user_agent.clone(),
            request,
        };
        let frame = encode_frame(&envelope)?;

        let mut guard = self.transport.lock().await;
        // Taken out for the duration of the call: if this future is dropped
        // mid-exchange, the half-used stream goes with it.
        let mut transport = match guard.take() {
            Some(transport) => transport,
            None => self.dial().await?,
        };

        let response = exchange(&mut transport, &frame).await?;
        *guard = Some(transport);

        match response {
            RpcResponse::Error(status) => Err(Error::Remote(status)),
            other => Ok(other),
        }
    }
}

impl std::fmt::Debug for WireClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireClient")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}

impl RpcClient for WireClient {
    fn call(&self, request: RpcRequest) -> BoxFuture<'_, Result<RpcResponse>> {
        let span = tracing::debug_span!("rpc_call", method = request.method());
        self.round_trip(request).instrument(span).boxed()
    }
}

/// Write one request frame and read one response frame
async fn exchange(transport: &mut Transport, frame: &[u8]) -> Result<RpcResponse> {
    transport.write_all(frame).await?;
    transport.flush().await?;

    let mut read_buf = BytesMut::with_capacity(8192);
    loop {
        match decode_frame::<RpcResponse>(&read_buf) {
            Ok((msg, _consumed)) => return Ok(msg),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {}
            Err(e) => return Err(Error::Protocol(e.to_string())),
        }

        let n = transport.read_buf(&mut read_buf).await?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
    }
}
