// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from the UnixSock framing and JSON-RPC client.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("short write: expected {expected} bytes, wrote {got}")]
    ShortWrite { expected: usize, got: usize },

    #[error("socket closed")]
    Closed,

    #[error("HTTP status line was not 200 OK: {0}")]
    BadHttpStatus(String),

    #[error("malformed JSON-RPC response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ancillary FD message malformed or missing")]
    BadAncillaryData,

    #[error("nix error: {0}")]
    Nix(#[from] nix::Error),
}
