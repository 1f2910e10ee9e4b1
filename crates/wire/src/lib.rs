// SPDX-License-Identifier: MIT

//! Unix socket framing, ancillary FD passing, and the line-framed
//! JSON-RPC client used to talk to the bitcoin daemon.
//!
//! Everything here is synchronous: the supervisor's concurrency model is
//! pre-emptive OS threads calling blocking syscalls, not an async
//! runtime, since the supervisor must `fork()` — something that doesn't
//! mix safely with a multi-threaded async executor.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod connsock;
mod error;
mod fd_pass;
mod framing;
mod server;

pub use connsock::{json_rpc_call, read_socket_line, ConnSock};
pub use error::WireError;
pub use fd_pass::{recv_fd, send_fd};
pub use framing::{recv_msg, send_msg};
pub use server::{open_unix_client, open_unix_server};
