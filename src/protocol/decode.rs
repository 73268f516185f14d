//! Frame decoding

use super::constants::{FRAME_HEADER_LEN, MAX_FRAME_LENGTH};
use serde::de::DeserializeOwned;
use std::io;

/// Decode one length-prefixed JSON frame from the front of `data`
///
/// # Returns
/// `Ok((msg, consumed))` - Message and number of bytes consumed
/// `Err(e)` - `UnexpectedEof` if the frame is incomplete, `InvalidData` if it is malformed
pub fn decode_frame<T: DeserializeOwned>(data: &[u8]) -> io::Result<(T, usize)> {
    if data.len() < FRAME_HEADER_LEN {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "incomplete frame header",
        ));
    }

    let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;

    if len > MAX_FRAME_LENGTH {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "frame length {} exceeds maximum allowed {}",
                len, MAX_FRAME_LENGTH
            ),
        ));
    }

    let end = FRAME_HEADER_LEN + len;
    if data.len() < end {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "incomplete frame body",
        ));
    }

    let msg = serde_json::from_slice(&data[FRAME_HEADER_LEN..end])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok((msg, end))
}
