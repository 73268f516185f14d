//! Metric label values

/// Establishment stage: client construction
pub const STAGE_CLIENT_INIT: &str = "client_init";

/// Establishment stage: open-session call
pub const STAGE_SESSION_OPEN: &str = "session_open";

/// Establishment stage: response validation
pub const STAGE_RESPONSE: &str = "response";

/// Establishment stage: session parameter replay
pub const STAGE_SESSION_PARAMS: &str = "session_params";
