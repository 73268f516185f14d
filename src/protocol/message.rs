//! Protocol message types

use super::constants::PROTOCOL_VERSION_BASE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Client protocol version negotiated at session open
///
/// Travels on the wire as its numeric code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum ProtocolVersion {
    /// Version 1
    V1,
    /// Version 2
    V2,
    /// Version 3
    V3,
    /// Version 4
    V4,
    /// Version 5
    V5,
    /// Version 6 (direct results, multiple catalogs)
    #[default]
    V6,
    /// Version 7
    V7,
}

impl ProtocolVersion {
    /// Numeric protocol code
    pub fn code(&self) -> i32 {
        let offset = match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
            Self::V5 => 5,
            Self::V6 => 6,
            Self::V7 => 7,
        };
        PROTOCOL_VERSION_BASE + offset
    }
}

impl From<ProtocolVersion> for i32 {
    fn from(version: ProtocolVersion) -> i32 {
        version.code()
    }
}

impl TryFrom<i32> for ProtocolVersion {
    type Error = String;

    fn try_from(code: i32) -> std::result::Result<Self, Self::Error> {
        match code - PROTOCOL_VERSION_BASE {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            5 => Ok(Self::V5),
            6 => Ok(Self::V6),
            7 => Ok(Self::V7),
            _ => Err(format!("unknown protocol version {:#x}", code)),
        }
    }
}

/// Status code attached to every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Call succeeded
    Success,
    /// Call succeeded with warnings
    SuccessWithInfo,
    /// Call accepted, still running
    StillExecuting,
    /// Call failed
    Error,
    /// Referenced handle is unknown or closed
    InvalidHandle,
}

/// Response status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Status code
    pub status_code: StatusCode,
    /// Server error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// SQLSTATE, when the server reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_state: Option<String>,
}

impl Status {
    /// Successful status
    pub fn success() -> Self {
        Self {
            status_code: StatusCode::Success,
            error_message: None,
            sql_state: None,
        }
    }

    /// Failed status with a message
    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code,
            error_message: Some(message.into()),
            sql_state: None,
        }
    }

    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        matches!(
            self.status_code,
            StatusCode::Success | StatusCode::SuccessWithInfo
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.status_code)?;
        if let Some(state) = &self.sql_state {
            write!(f, " [{}]", state)?;
        }
        if let Some(msg) = &self.error_message {
            write!(f, ": {}", msg)?;
        }
        Ok(())
    }
}

/// Catalog or schema identifier, passed through unvalidated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    /// Identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Initial namespace for a session
///
/// An absent field means "server default", which is not the same as an
/// explicitly empty identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Catalog name
    pub catalog_name: Option<Identifier>,
    /// Schema name
    pub schema_name: Option<Identifier>,
}

/// Binary handle identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleIdentifier {
    /// Session GUID bytes
    pub guid: Vec<u8>,
    /// Server secret bytes
    #[serde(default)]
    pub secret: Vec<u8>,
}

/// Server-issued session handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    /// Session identity
    pub session_id: HandleIdentifier,
}

/// Open-session request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSessionRequest {
    /// Client protocol version
    pub client_protocol: ProtocolVersion,
    /// Server-side configuration overrides
    pub configuration: HashMap<String, String>,
    /// Initial catalog/schema
    pub initial_namespace: Option<Namespace>,
    /// Whether the client can address multiple catalogs
    pub can_use_multiple_catalogs: Option<bool>,
}

/// Open-session response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSessionResponse {
    /// Call status
    pub status: Status,
    /// Protocol version the server settled on
    pub server_protocol_version: ProtocolVersion,
    /// Handle of the opened session
    #[serde(default)]
    pub session_handle: Option<SessionHandle>,
    /// Effective server configuration
    #[serde(default)]
    pub configuration: HashMap<String, String>,
}

/// Statement execution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteStatementRequest {
    /// Session to run in
    pub session_handle: SessionHandle,
    /// SQL text
    pub statement: String,
    /// Server-side execution timeout in seconds (0 = none)
    pub query_timeout: u64,
}

/// Statement execution response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteStatementResponse {
    /// Call status
    pub status: Status,
    /// Affected rows, for DML
    #[serde(default)]
    pub rows_affected: Option<i64>,
}

/// Close-session request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseSessionRequest {
    /// Session to close
    pub session_handle: SessionHandle,
}

/// Close-session response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseSessionResponse {
    /// Call status
    pub status: Status,
}

/// Remote call (client → server)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum RpcRequest {
    /// Open a session
    OpenSession(OpenSessionRequest),
    /// Execute a statement
    ExecuteStatement(ExecuteStatementRequest),
    /// Close a session
    CloseSession(CloseSessionRequest),
}

impl RpcRequest {
    /// Method name, for logs
    pub fn method(&self) -> &'static str {
        match self {
            Self::OpenSession(_) => "open_session",
            Self::ExecuteStatement(_) => "execute_statement",
            Self::CloseSession(_) => "close_session",
        }
    }
}

/// Remote call reply (server → client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "result", rename_all = "snake_case")]
pub enum RpcResponse {
    /// Reply to `OpenSession`
    OpenSession(OpenSessionResponse),
    /// Reply to `ExecuteStatement`
    ExecuteStatement(ExecuteStatementResponse),
    /// Reply to `CloseSession`
    CloseSession(CloseSessionResponse),
    /// Call-level failure
    Error(Status),
}

impl RpcResponse {
    /// Method name, for logs and error context
    pub fn method(&self) -> &'static str {
        match self {
            Self::OpenSession(_) => "open_session",
            Self::ExecuteStatement(_) => "execute_statement",
            Self::CloseSession(_) => "close_session",
            Self::Error(_) => "error",
        }
    }
}

/// Request frame as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// RPC endpoint path
    pub path: String,
    /// Bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Client user agent
    pub user_agent: String,
    /// The call
    pub request: RpcRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_version_codes() {
        assert_eq!(ProtocolVersion::V1.code(), 0xA501);
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::V6);
        assert_eq!(ProtocolVersion::V6.code(), 0xA506);
    }

    #[test]
    fn test_protocol_version_on_wire_is_numeric() {
        assert_eq!(
            serde_json::to_value(ProtocolVersion::V6).unwrap(),
            serde_json::json!(0xA506)
        );
        let version: ProtocolVersion = serde_json::from_value(serde_json::json!(0xA507)).unwrap();
        assert_eq!(version, ProtocolVersion::V7);

        let err = serde_json::from_value::<ProtocolVersion>(serde_json::json!(0xA508)).unwrap_err();
        assert!(err.to_string().contains("unknown protocol version"));
        assert!(serde_json::from_value::<ProtocolVersion>(serde_json::json!("V6")).is_err());
    }

    #[test]
    fn test_status_display() {
        let mut status = Status::error(StatusCode::Error, "table not found");
        status.sql_state = Some("42P01".into());
        assert_eq!(status.to_string(), "Error [42P01]: table not found");
        assert_eq!(Status::success().to_string(), "Success");
    }

    #[test]
    fn test_status_success_with_info_is_success() {
        let status = Status {
            status_code: StatusCode::SuccessWithInfo,
            error_message: Some("deprecated option".into()),
            sql_state: None,
        };
        assert!(status.is_success());
        assert!(!Status::error(StatusCode::InvalidHandle, "gone").is_success());
    }

    #[test]
    fn test_absent_namespace_fields_serialize_as_null() {
        let json = serde_json::to_value(Namespace::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "catalog_name": null, "schema_name": null })
        );
    }

    #[test]
    fn test_request_is_tagged_by_method() {
        let req = RpcRequest::CloseSession(CloseSessionRequest {
            session_handle: SessionHandle {
                session_id: HandleIdentifier {
                    guid: vec![1; 16],
                    secret: vec![],
                },
            },
        });
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["method"], "close_session");
        assert_eq!(req.method(), "close_session");
    }
}
