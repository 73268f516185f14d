//! Session RPC protocol
//!
//! Message types for the open-session / execute / close-session calls,
//! the namespace and session-identity helpers, and the length-prefixed
//! JSON framing used by the reference wire client.

pub mod constants;
pub mod decode;
pub mod encode;
mod guid;
mod message;
mod namespace;

pub use decode::decode_frame;
pub use encode::encode_frame;
pub use guid::{Guid, SessionId};
pub use message::{
    CloseSessionRequest, CloseSessionResponse, ExecuteStatementRequest,
    ExecuteStatementResponse, HandleIdentifier, Identifier, Namespace, OpenSessionRequest,
    OpenSessionResponse, ProtocolVersion, RequestEnvelope, RpcRequest, RpcResponse,
    SessionHandle, Status, StatusCode,
};
pub use namespace::resolve_namespace;
