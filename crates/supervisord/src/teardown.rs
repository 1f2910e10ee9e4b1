// SPDX-License-Identifier: MIT

use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use tracing::{info, warn};

use crate::state::SupervisorState;

/// Connect to the supervisor's own control socket and send `shutdown`.
/// Used by both the signal bridge and the watchdog so every path that
/// decides "the process should end" funnels through the listener's
/// ordinary `shutdown` handling rather than duplicating the teardown
/// sequence at each call site.
pub fn request_shutdown(listener_path: &Path) {
    if let Ok(mut stream) = ckp_wire::open_unix_client(listener_path) {
        let _ = ckp_wire::send_msg(&mut stream, b"shutdown");
    }
}

/// The supervisor's own teardown sequence, run after the listener thread
/// returns (i.e. after it has processed a `shutdown` command). Sends
/// `SIGUSR1` to every live child, waits one second, `SIGKILL`s stragglers,
/// then removes the supervisor's own pid file and control socket.
pub fn run_teardown(state: &SupervisorState) {
    info!("tearing down");
    let pids: Vec<nix::unistd::Pid> =
        state.children.lock().iter().filter_map(|c| c.pid).collect();

    for pid in &pids {
        if signal::kill(*pid, None).is_ok() {
            let _ = signal::kill(*pid, Signal::SIGUSR1);
        }
    }

    sleep(Duration::from_secs(1));

    for pid in &pids {
        if signal::kill(*pid, None).is_ok() {
            warn!("child {pid} did not exit gracefully, sending SIGKILL");
            let _ = signal::kill(*pid, Signal::SIGKILL);
        }
    }

    let _ = std::fs::remove_file(state.paths.own_pid_file());
    let _ = std::fs::remove_file(state.paths.listener_socket());
    info!("teardown complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn request_shutdown_is_a_noop_without_a_listener() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listener");
        // No server bound at `path`; this must not panic or block.
        request_shutdown(&path);
    }
}
