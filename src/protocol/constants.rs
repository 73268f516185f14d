//! Protocol constants

/// Size of the big-endian length prefix on every frame
pub const FRAME_HEADER_LEN: usize = 4;

/// Maximum frame body length (64 MiB)
///
/// Frames whose length field exceeds this are rejected before allocation.
pub const MAX_FRAME_LENGTH: usize = 64 * 1024 * 1024;

/// Length of a session GUID in bytes
pub const GUID_LEN: usize = 16;

/// Default server port (HTTPS)
pub const DEFAULT_PORT: u16 = 443;

/// Base value protocol version codes are offset from
pub const PROTOCOL_VERSION_BASE: i32 = 0xA500;

/// User agent reported to the server, before any configured entry
pub const USER_AGENT: &str = concat!("dbsql-wire/", env!("CARGO_PKG_VERSION"));
