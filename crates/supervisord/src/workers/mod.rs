// SPDX-License-Identifier: MIT

mod connector;
mod generator;
mod stratifier;

pub use connector::run as connector_entry;
pub use generator::run as generator_entry;
pub use stratifier::run as stratifier_entry;

use std::os::unix::net::UnixStream;

use ckp_core::is_valid_level;
use ckp_logging::LogLevel;
use tracing::warn;

use crate::child::ChildContext;

/// Shared control-socket accept loop for worker entry functions: answers
/// `ping`/`loglevel=N`/`shutdown` directly and defers anything else to
/// `extra`, which returns `true` if it handled the command (in which case
/// no reply is sent here — `extra` is responsible for its own reply) or
/// `false` to fall through to an `unknown` reply.
pub fn serve_control_loop(
    ctx: &ChildContext,
    level: &LogLevel,
    mut extra: impl FnMut(&str, &mut UnixStream) -> bool,
) -> i32 {
    loop {
        let (mut stream, _) = match ctx.control_sock.accept() {
            Ok(pair) => pair,
            Err(e) => {
                warn!("{}: control accept failed: {e}", ctx.name);
                continue;
            }
        };

        let Ok(msg) = ckp_wire::recv_msg(&mut stream) else { continue };
        let command = String::from_utf8_lossy(&msg).into_owned();

        match command.as_str() {
            "ping" => {
                let _ = ckp_wire::send_msg(&mut stream, b"pong");
            }
            "shutdown" => {
                let _ = ckp_wire::send_msg(&mut stream, b"exiting");
                return 0;
            }
            cmd if cmd.starts_with("loglevel=") => {
                handle_loglevel(cmd, level, &mut stream);
            }
            other => {
                if !extra(other, &mut stream) {
                    let _ = ckp_wire::send_msg(&mut stream, b"unknown");
                }
            }
        }
    }
}

fn handle_loglevel(cmd: &str, level: &LogLevel, stream: &mut UnixStream) {
    let parsed = cmd.strip_prefix("loglevel=").and_then(|s| s.parse::<i64>().ok());
    match parsed {
        Some(raw) if is_valid_level(raw) => {
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            level.set(raw as u8);
            let _ = ckp_wire::send_msg(stream, b"success");
        }
        _ => {
            let _ = ckp_wire::send_msg(stream, b"Invalid");
        }
    }
}
