//! Session identity rendering

use super::constants::GUID_LEN;
use crate::{Error, Result};
use std::fmt;

/// Fixed-size binary session identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid([u8; GUID_LEN]);

impl Guid {
    /// Wrap raw identity bytes
    pub fn from_bytes(bytes: [u8; GUID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw identity bytes
    pub fn as_bytes(&self) -> &[u8; GUID_LEN] {
        &self.0
    }

    /// Human-readable rendering, for correlation only
    pub fn session_id(&self) -> SessionId {
        SessionId(self.to_string())
    }
}

impl TryFrom<&[u8]> for Guid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; GUID_LEN] = bytes.try_into().map_err(|_| {
            Error::Protocol(format!(
                "session guid must be {} bytes, got {}",
                GUID_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 8-4-4-4-12 lowercase hex
        write!(f, "{}", uuid::Uuid::from_bytes(self.0).hyphenated())
    }
}

/// Display form of a session identity
///
/// Used in logs and diagnostics. Never sent back to the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Rendered text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
