// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Thin administrative client for a running `ckpoold` supervisor: frames a
/// command string, sends it down the listener's control socket, and prints
/// whatever comes back. It has no access the wire protocol in `ckp-wire`
/// doesn't already expose over the socket.
#[derive(Debug, Parser)]
#[command(name = "ckpoolctl", version, about = "control client for ckpoold")]
pub struct Cli {
    /// Control-socket directory the target supervisor was started with.
    #[arg(short = 's', long = "sockdir")]
    pub sockdir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the supervisor is alive and responding.
    Ping,
    /// Set the runtime log level (0 = emergency .. 7 = debug) and
    /// broadcast it to every child.
    Loglevel {
        #[arg(value_name = "0-7")]
        level: u8,
    },
    /// Request an orderly shutdown of the supervisor and every child.
    Shutdown,
    /// Fork a new generation that takes over via handover.
    Restart,
}

impl Command {
    /// The exact wire string sent for this subcommand, per the listener's
    /// command table.
    pub fn wire_command(&self) -> String {
        match self {
            Command::Ping => "ping".to_string(),
            Command::Loglevel { level } => format!("loglevel={level}"),
            Command::Shutdown => "shutdown".to_string(),
            Command::Restart => "restart".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loglevel_renders_as_key_value() {
        assert_eq!(Command::Loglevel { level: 5 }.wire_command(), "loglevel=5");
    }

    #[test]
    fn ping_and_shutdown_are_bare_words() {
        assert_eq!(Command::Ping.wire_command(), "ping");
        assert_eq!(Command::Shutdown.wire_command(), "shutdown");
    }
}
