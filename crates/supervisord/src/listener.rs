// SPDX-License-Identifier: MIT

use std::ffi::CString;
use std::os::fd::AsRawFd;
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::Arc;

use ckp_core::is_valid_level;
use nix::sys::signal;
use nix::unistd::{ForkResult, Pid};
use tracing::{info, warn};

use crate::state::SupervisorState;

const CONNECTOR_NAME: &str = "connector";

/// `kill(pid, 0)` reachability probe, per §7's "peer gone" taxonomy: a
/// child whose pid no longer answers is presumed dead, and a send to it
/// is suppressed rather than attempted.
fn child_reachable(pid: Option<Pid>) -> bool {
    pid.is_some_and(|p| signal::kill(p, None).is_ok())
}

/// Runs the supervisor's own control listener (`<socket_dir>/listener`)
/// until a `shutdown` command is received. Requests are handled
/// sequentially — the control plane is low-rate administrative traffic,
/// not a data path, so there's no value in concurrent handling.
pub fn run_listener(state: &Arc<SupervisorState>, listener: &UnixListener) {
    loop {
        let (mut stream, _) = match listener.accept() {
            Ok(pair) => pair,
            Err(e) => {
                warn!("control listener accept failed: {e}");
                continue;
            }
        };

        let Ok(request) = ckp_wire::recv_msg(&mut stream) else { continue };
        let command = String::from_utf8_lossy(&request).into_owned();

        match command.as_str() {
            "shutdown" => {
                let _ = ckp_wire::send_msg(&mut stream, b"exiting");
                info!("shutdown requested over control socket");
                return;
            }
            "ping" => {
                let _ = ckp_wire::send_msg(&mut stream, b"pong");
            }
            "getfd" => handle_getfd(state, &mut stream),
            "restart" => handle_restart(state),
            cmd if cmd.starts_with("loglevel=") => handle_loglevel(state, cmd, &mut stream),
            _ => {
                let _ = ckp_wire::send_msg(&mut stream, b"unknown");
            }
        }
    }
}

fn handle_loglevel(state: &Arc<SupervisorState>, cmd: &str, stream: &mut UnixStream) {
    let Some(raw) = cmd.strip_prefix("loglevel=").and_then(|s| s.parse::<i64>().ok()) else {
        let _ = ckp_wire::send_msg(stream, b"Invalid");
        return;
    };
    if !is_valid_level(raw) {
        let _ = ckp_wire::send_msg(stream, b"Invalid");
        return;
    }
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let level = raw as u8;

    state.log_level.set(level);
    broadcast_loglevel(state, level);
    let _ = ckp_wire::send_msg(stream, b"success");
}

fn broadcast_loglevel(state: &Arc<SupervisorState>, level: u8) {
    let children = state.children.lock();
    let message = format!("loglevel={level}");
    for child in children.iter() {
        if !child_reachable(child.pid) {
            ckp_logging::alert!("loglevel broadcast: child {} is unreachable, send suppressed", child.name);
            continue;
        }
        let path = state.paths.child_socket(child.sock_name);
        if let Ok(mut sock) = ckp_wire::open_unix_client(&path) {
            let _ = ckp_wire::send_msg(&mut sock, message.as_bytes());
        }
    }
}

/// Ask the connector child for its listening socket and forward it to the
/// original caller: two FD hops, never multiplexing through the
/// supervisor's own accept loop for the actual TCP traffic.
fn handle_getfd(state: &Arc<SupervisorState>, requester: &mut UnixStream) {
    let children = state.children.lock();
    let Some(connector) = children.iter().find(|c| c.name == CONNECTOR_NAME) else {
        warn!("getfd requested but no connector child is registered");
        return;
    };
    if !child_reachable(connector.pid) {
        ckp_logging::alert!("getfd: connector is unreachable, send suppressed");
        return;
    }
    let path = state.paths.child_socket(connector.sock_name);
    drop(children);

    let Ok(mut sock) = ckp_wire::open_unix_client(&path) else {
        warn!("getfd: failed to reach connector control socket");
        return;
    };
    if ckp_wire::send_msg(&mut sock, b"getfd").is_err() {
        warn!("getfd: failed to ask connector for its listening fd");
        return;
    }
    match ckp_wire::recv_fd(&sock) {
        Ok(fd) => {
            if let Err(e) = ckp_wire::send_fd(fd.as_raw_fd(), &*requester) {
                warn!("getfd: failed to forward fd to requester: {e}");
            }
        }
        Err(e) => warn!("getfd: failed to receive fd from connector: {e}"),
    }
}

/// Fork an executor that re-execs the original argv with `-H` appended
/// (unless the current process is already in handover mode, in which case
/// argv already carries it). The executor never returns on success; on
/// `execv` failure it logs and exits rather than leaking the fork.
fn handle_restart(state: &Arc<SupervisorState>) {
    let mut argv = state.initial_args.clone();
    if !state.mode.handover {
        argv.push("-H".to_string());
    }

    match unsafe { nix::unistd::fork() } {
        Ok(ForkResult::Parent { .. }) => {}
        Ok(ForkResult::Child) => {
            let Ok(path) = CString::new(argv[0].as_bytes()) else {
                eprintln!("restart: argv[0] contains a NUL byte");
                nix::unistd::_exit(1);
            };
            let cargs: Result<Vec<CString>, _> =
                argv.iter().map(|a| CString::new(a.as_bytes())).collect();
            let Ok(cargs) = cargs else {
                eprintln!("restart: argv contains a NUL byte");
                nix::unistd::_exit(1);
            };
            // execv only returns on failure.
            let _ = nix::unistd::execv(&path, &cargs);
            eprintln!("restart: execv failed, exiting forked executor");
            nix::unistd::_exit(1);
        }
        Err(e) => warn!("restart: fork failed: {e}"),
    }
}
