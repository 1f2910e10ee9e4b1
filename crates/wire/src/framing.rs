// SPDX-License-Identifier: MIT

use std::io::{Read, Write};

use crate::WireError;

/// Maximum accepted message length. A generous multiple of the 1 MiB
/// payloads this framing is expected to carry, leaving headroom without
/// accepting unbounded allocations from a hostile or corrupted peer.
pub const MAX_MESSAGE_LEN: u32 = 64 * 1024 * 1024;

/// Write a length-prefixed message: 4-byte big-endian length, then the
/// payload. Any short write closes out as an error — the caller is
/// expected to close the socket on failure.
pub fn send_msg<W: Write>(mut writer: W, payload: &[u8]) -> Result<(), WireError> {
    let len = u32::try_from(payload.len()).map_err(|_| WireError::ShortWrite {
        expected: payload.len(),
        got: 0,
    })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read a length-prefixed message: 4-byte big-endian length, then exactly
/// that many payload bytes. Any short read is reported, and the caller
/// should treat the socket as closed.
pub fn recv_msg<R: Read>(mut reader: R) -> Result<Vec<u8>, WireError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(WireError::Closed),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_LEN {
        return Err(WireError::ShortRead { expected: len as usize, got: 0 });
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            WireError::ShortRead { expected: len as usize, got: 0 }
        } else {
            WireError::Io(e)
        }
    })?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_byte_exact() {
        let original = b"hello world".to_vec();
        let mut buf = Vec::new();
        send_msg(&mut buf, &original).unwrap();
        assert_eq!(buf.len(), 4 + original.len());
        let read_back = recv_msg(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(read_back, original);
    }

    #[test]
    fn roundtrip_large_payload() {
        let original = vec![0xABu8; 2 * 1024 * 1024];
        let mut buf = Vec::new();
        send_msg(&mut buf, &original).unwrap();
        let read_back = recv_msg(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(read_back, original);
    }

    #[test]
    fn prefix_is_big_endian_length() {
        let data = b"test data";
        let mut buf = Vec::new();
        send_msg(&mut buf, data).unwrap();
        let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(len, data.len());
        assert_eq!(&buf[4..], data);
    }

    #[test]
    fn short_read_reports_closed() {
        let buf = vec![0u8, 0, 0, 5, b'h', b'i']; // claims 5 bytes, only 2 present
        let err = recv_msg(std::io::Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, WireError::ShortRead { .. }));
    }

    #[test]
    fn empty_stream_is_closed() {
        let err = recv_msg(std::io::Cursor::new(Vec::<u8>::new())).unwrap_err();
        assert!(matches!(err, WireError::Closed));
    }
}
