//! Scripted RPC client shared by the connector tests

#![allow(dead_code)]

use dbsql_wire::connection::{ClientFactory, RpcClient};
use dbsql_wire::protocol::{
    CloseSessionResponse, ExecuteStatementResponse, HandleIdentifier, OpenSessionRequest,
    OpenSessionResponse, ProtocolVersion, RpcRequest, RpcResponse, SessionHandle, Status,
    StatusCode,
};
use dbsql_wire::{Config, Error, Result};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Session guid handed out by [`OpenBehavior::Succeed`] unless overridden
pub const GUID: [u8; 16] = [
    0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef,
];

/// Rendered form of [`GUID`]
pub const GUID_TEXT: &str = "12345678-9abc-def0-0123-456789abcdef";

/// How the scripted server answers open-session
#[derive(Debug, Clone)]
pub enum OpenBehavior {
    /// Reply with a handle carrying these guid bytes
    Succeed(Vec<u8>),
    /// Never reply
    Hang,
    /// Fail the call with a remote error
    RemoteError(String),
    /// Reply with an open-session response carrying a failure status
    FailureStatus(String),
    /// Reply with a success status but no handle
    MissingHandle,
    /// Reply with the wrong response kind
    WrongShape,
}

/// Scripted RPC client that records what it was asked
pub struct MockClient {
    open: OpenBehavior,
    fail_exec_at: Option<usize>,
    opens: AtomicUsize,
    open_requests: Mutex<Vec<OpenSessionRequest>>,
    statements: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new(open: OpenBehavior) -> Self {
        Self {
            open,
            fail_exec_at: None,
            opens: AtomicUsize::new(0),
            open_requests: Mutex::new(Vec::new()),
            statements: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(OpenBehavior::Succeed(GUID.to_vec()))
    }

    /// Fail the `k`-th execute call (1-based)
    pub fn fail_exec_at(mut self, k: usize) -> Self {
        self.fail_exec_at = Some(k);
        self
    }

    pub fn open_calls(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn open_requests(&self) -> Vec<OpenSessionRequest> {
        self.open_requests.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn open_session(&self, request: OpenSessionRequest) -> Option<Result<RpcResponse>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.open_requests.lock().unwrap().push(request);

        let handle = |guid: Vec<u8>| SessionHandle {
            session_id: HandleIdentifier {
                guid,
                secret: vec![0xaa; 4],
            },
        };
        let response = |session_handle| {
            RpcResponse::OpenSession(OpenSessionResponse {
                status: Status::success(),
                server_protocol_version: ProtocolVersion::V6,
                session_handle,
                configuration: HashMap::new(),
            })
        };

        match &self.open {
            OpenBehavior::Succeed(guid) => Some(Ok(response(Some(handle(guid.clone()))))),
            OpenBehavior::Hang => None,
            OpenBehavior::RemoteError(msg) => {
                Some(Err(Error::Remote(Status::error(StatusCode::Error, msg.clone()))))
            }
            OpenBehavior::FailureStatus(msg) => {
                Some(Ok(RpcResponse::OpenSession(OpenSessionResponse {
                    status: Status::error(StatusCode::Error, msg.clone()),
                    server_protocol_version: ProtocolVersion::V6,
                    session_handle: None,
                    configuration: HashMap::new(),
                })))
            }
            OpenBehavior::MissingHandle => Some(Ok(response(None))),
            OpenBehavior::WrongShape => Some(Ok(RpcResponse::CloseSession(CloseSessionResponse {
                status: Status::success(),
            }))),
        }
    }

    fn execute(&self, statement: String) -> Result<RpcResponse> {
        let mut statements = self.statements.lock().unwrap();
        statements.push(statement.clone());

        let status = if self.fail_exec_at == Some(statements.len()) {
            Status::error(StatusCode::Error, format!("rejected: {}", statement))
        } else {
            Status::success()
        };
        Ok(RpcResponse::ExecuteStatement(ExecuteStatementResponse {
            status,
            rows_affected: None,
        }))
    }
}

impl RpcClient for MockClient {
    fn call(&self, request: RpcRequest) -> BoxFuture<'_, Result<RpcResponse>> {
        let reply = match request {
            RpcRequest::OpenSession(req) => self.open_session(req),
            RpcRequest::ExecuteStatement(req) => Some(self.execute(req.statement)),
            RpcRequest::CloseSession(_) => {
                Some(Ok(RpcResponse::CloseSession(CloseSessionResponse {
                    status: Status::success(),
                })))
            }
        };

        match reply {
            Some(reply) => async move { reply }.boxed(),
            None => futures::future::pending().boxed(),
        }
    }
}

/// Hands out one shared [`MockClient`]
pub struct MockFactory {
    pub client: Arc<MockClient>,
    pub inits: AtomicUsize,
}

impl MockFactory {
    pub fn new(client: MockClient) -> Arc<Self> {
        Arc::new(Self {
            client: Arc::new(client),
            inits: AtomicUsize::new(0),
        })
    }
}

impl ClientFactory for MockFactory {
    fn init(&self, _config: &Config) -> Result<Arc<dyn RpcClient>> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(self.client.clone())
    }
}

/// Factory that cannot build a client
pub struct FailingFactory;

impl ClientFactory for FailingFactory {
    fn init(&self, _config: &Config) -> Result<Arc<dyn RpcClient>> {
        Err(Error::Config("no route to transport".into()))
    }
}

/// Base configuration pointed at the scripted server
pub fn config() -> dbsql_wire::ConfigBuilder {
    Config::builder()
        .server_hostname("mock.example")
        .port(443)
        .rpc_path("/sql/1.0/endpoints/mock")
        .access_token("token")
        .poll_interval(std::time::Duration::from_millis(10))
}
