// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};

use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::{error, info, warn};

use crate::child::launch_process;
use crate::state::SupervisorState;
use crate::teardown::request_shutdown;

/// The watchdog's one-second respawn-storm brake: a child that dies
/// within a second of its own launch is treated as crash-looping rather
/// than respawned again.
const STORM_WINDOW: Duration = Duration::from_secs(1);

/// `waitpid(-1, ...)` in a loop, relaunching known children and
/// triggering shutdown for unknown pids or respawn storms. Returns when a
/// shutdown has been requested (either because it decided to request one
/// itself, or because `cancel` was observed).
pub fn run_watchdog(state: &SupervisorState, cancel: &std::sync::atomic::AtomicBool) {
    loop {
        if cancel.load(std::sync::atomic::Ordering::SeqCst) {
            return;
        }

        let status = match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                std::thread::sleep(Duration::from_millis(200));
                continue;
            }
            Ok(status) => status,
            Err(nix::errno::Errno::ECHILD) => {
                std::thread::sleep(Duration::from_millis(200));
                continue;
            }
            Err(e) => {
                warn!("waitpid failed: {e}");
                continue;
            }
        };

        let Some(pid) = status.pid() else { continue };

        match status {
            WaitStatus::Exited(..) => {
                if is_known_child(state, pid) {
                    info!("child {pid} exited on its own, shutting down");
                } else {
                    info!("unknown pid {pid} reaped, shutting down");
                }
                request_shutdown(&state.paths.listener_socket());
                return;
            }
            WaitStatus::Signaled(..) => {
                let Some(index) = child_index(state, pid) else {
                    info!("unknown pid {pid} killed, shutting down");
                    request_shutdown(&state.paths.listener_socket());
                    return;
                };

                if is_storming(state, index) {
                    ckp_logging::emerg!(
                        "child respawned and died within {STORM_WINDOW:?}, respawn-storm brake engaged"
                    );
                    request_shutdown(&state.paths.listener_socket());
                    return;
                }

                relaunch(state, index);
            }
            _ => {}
        }
    }
}

fn is_known_child(state: &SupervisorState, pid: Pid) -> bool {
    state.children.lock().iter().any(|c| c.pid == Some(pid))
}

fn child_index(state: &SupervisorState, pid: Pid) -> Option<usize> {
    state.children.lock().iter().position(|c| c.pid == Some(pid))
}

fn is_storming(state: &SupervisorState, index: usize) -> bool {
    let children = state.children.lock();
    children[index].last_launch.map(|t| Instant::now().duration_since(t) < STORM_WINDOW).unwrap_or(false)
}

fn relaunch(state: &SupervisorState, index: usize) {
    let mut children = state.children.lock();
    let name = children[index].name;
    let serverurl = if name == "connector" { state.serverurl.clone() } else { None };
    let result = launch_process(
        &mut children[index],
        &state.paths,
        state.group,
        state.log_level.get(),
        false,
        None,
        serverurl,
    );
    drop(children);

    match result {
        Ok(()) => info!("respawned child {name}"),
        Err(e) => {
            error!("failed to respawn child {name}: {e}");
            request_shutdown(&state.paths.listener_socket());
        }
    }
}
