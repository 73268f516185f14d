#![no_main]

use bytes::{Buf, BytesMut};
use dbsql_wire::protocol::{decode_frame, RpcResponse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buf = BytesMut::from(data);

    // Several frames may arrive in a single TCP segment
    while !buf.is_empty() {
        match decode_frame::<RpcResponse>(&buf) {
            Ok((_, consumed)) if consumed > 0 => buf.advance(consumed),
            _ => break,
        }
    }
});
