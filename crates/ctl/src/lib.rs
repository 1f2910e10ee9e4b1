// SPDX-License-Identifier: MIT

//! Administrative CLI client for a running supervisor: connects to
//! `<sockdir>/listener`, sends one length-prefixed command, and prints
//! whatever comes back. See `ckp-wire` for the framing and `ckp-supervisord`
//! for the command table this speaks against.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod cli;
mod error;

use std::path::Path;

pub use cli::{Cli, Command};
pub use error::CtlError;

/// Replies that indicate the command failed on the server side. Anything
/// else, including `restart`'s silent lack of reply, is a success.
const FAILURE_REPLIES: [&str; 3] = ["Failed", "Invalid", "unknown"];

/// Send `command` to the listener socket under `sockdir` and return the
/// textual reply, if any. `restart` gets none by design (§4.6): the
/// listener forks and moves on to its next `accept` without replying.
pub fn send_command(sockdir: &Path, command: &Command) -> Result<Option<String>, CtlError> {
    let listener_path = sockdir.join("listener");
    let mut stream = ckp_wire::open_unix_client(&listener_path)
        .map_err(|e| CtlError::Connect(listener_path.clone(), e))?;

    ckp_wire::send_msg(&mut stream, command.wire_command().as_bytes()).map_err(CtlError::Send)?;

    if matches!(command, Command::Restart) {
        return Ok(None);
    }

    let reply = ckp_wire::recv_msg(&mut stream).map_err(CtlError::Recv)?;
    Ok(Some(String::from_utf8_lossy(&reply).into_owned()))
}

/// `true` if `reply` represents success, per the listener's command table.
pub fn is_success(reply: &str) -> bool {
    !FAILURE_REPLIES.contains(&reply)
}
