//! Frame encoding

use super::constants::{FRAME_HEADER_LEN, MAX_FRAME_LENGTH};
use bytes::{BufMut, BytesMut};
use serde::Serialize;
use std::io;

/// Encode a message into a length-prefixed JSON frame
pub fn encode_frame<T: Serialize>(msg: &T) -> io::Result<BytesMut> {
    let mut buf = BytesMut::with_capacity(256);

    // Reserve space for length (filled in below)
    buf.put_u32(0);

    let mut writer = buf.writer();
    serde_json::to_writer(&mut writer, msg)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut buf = writer.into_inner();

    let len = buf.len() - FRAME_HEADER_LEN;
    if len > MAX_FRAME_LENGTH {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "frame length {} exceeds maximum allowed {}",
                len, MAX_FRAME_LENGTH
            ),
        ));
    }
    buf[..FRAME_HEADER_LEN].copy_from_slice(&(len as u32).to_be_bytes());

    Ok(buf)
}
