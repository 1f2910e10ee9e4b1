// SPDX-License-Identifier: MIT

use std::fs;
use std::io::Write as _;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::time::Instant;

use ckp_core::Paths;
use nix::sys::signal::{self, Signal};
use nix::unistd::{ForkResult, Gid, Pid};

use crate::error::LifecycleError;

/// Per-worker context handed to an entry function after fork, pid-file
/// write, and signal-handler installation have all completed.
pub struct ChildContext {
    pub name: String,
    pub paths: Paths,
    pub group: Option<Gid>,
    pub initial_loglevel: u8,
    pub control_sock: UnixListener,
    /// Set only for the connector during a handover: the previous
    /// generation's listening socket, to be adopted instead of binding
    /// a fresh one.
    pub inherited_listen_fd: Option<OwnedFd>,
    /// The config file's `serverurl`, consulted by the connector when it
    /// has no inherited listening socket to adopt.
    pub serverurl: Option<String>,
}

pub type EntryFn = fn(ChildContext) -> i32;

/// A forked worker, as tracked by the supervisor.
pub struct Child {
    pub name: &'static str,
    pub sock_name: &'static str,
    pub pid: Option<Pid>,
    pub control_sock: UnixListener,
    pub entry: EntryFn,
    pub last_launch: Option<Instant>,
}

/// Bind the child's control socket before forking, so both generations of
/// the fork share no ambiguity about who owns the bind.
pub fn prepare_child(
    paths: &Paths,
    group: Option<Gid>,
    name: &'static str,
    sock_name: &'static str,
    entry: EntryFn,
) -> Result<Child, LifecycleError> {
    let path = paths.child_socket(sock_name);
    let listener = ckp_wire::open_unix_server(&path, group)
        .map_err(|e| LifecycleError::Bind(path, e))?;
    Ok(Child { name, sock_name, pid: None, control_sock: listener, entry, last_launch: None })
}

/// Fork and run `child.entry` in the child process. The parent gets back
/// the child's new pid; the child process never returns from this
/// function — it runs its entry function to completion and calls
/// `std::process::exit`.
#[allow(clippy::too_many_arguments)]
pub fn launch_process(
    child: &mut Child,
    paths: &Paths,
    group: Option<Gid>,
    initial_loglevel: u8,
    kill_old: bool,
    inherited_listen_fd: Option<OwnedFd>,
    serverurl: Option<String>,
) -> Result<(), LifecycleError> {
    // Safety: this process is single-threaded with respect to the work
    // done between fork and exec/exit in the child branch below — no
    // locks are held, no allocator state is shared beyond what libc's
    // fork contract already guarantees safe.
    match unsafe { nix::unistd::fork() }.map_err(LifecycleError::Fork)? {
        ForkResult::Parent { child: pid } => {
            child.pid = Some(pid);
            child.last_launch = Some(Instant::now());
            Ok(())
        }
        ForkResult::Child => {
            let control_sock = match child.control_sock.try_clone() {
                Ok(listener) => listener,
                Err(e) => {
                    eprintln!("{}: failed to clone inherited control socket: {e}", child.name);
                    std::process::exit(1);
                }
            };
            let code = run_child(
                child.name,
                paths.clone(),
                group,
                initial_loglevel,
                kill_old,
                control_sock,
                inherited_listen_fd,
                serverurl,
                child.entry,
            );
            std::process::exit(code);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_child(
    name: &str,
    paths: Paths,
    group: Option<Gid>,
    initial_loglevel: u8,
    kill_old: bool,
    control_sock: UnixListener,
    inherited_listen_fd: Option<OwnedFd>,
    serverurl: Option<String>,
    entry: EntryFn,
) -> i32 {
    install_child_signal_handlers();
    rename_process_title(name);

    let pid_file = paths.child_pid_file(name);
    if let Err(e) = write_pid_file_checked(&pid_file, kill_old) {
        eprintln!("{name}: {e}");
        return 1;
    }

    let ctx = ChildContext {
        name: name.to_string(),
        paths,
        group,
        initial_loglevel,
        control_sock,
        inherited_listen_fd,
        serverurl,
    };
    let code = entry(ctx);

    let _ = fs::remove_file(&pid_file);
    code
}

/// Write `pid_file` with our own pid, first checking for a stale live
/// process. If one is found and `kill_old` is not set, this is a fatal
/// startup condition for the child (mirrored by the parent observing the
/// child's non-zero exit). If `kill_old` is set, the stale process is
/// killed and the file is overwritten.
pub fn write_pid_file_checked(pid_file: &PathBuf, kill_old: bool) -> std::io::Result<()> {
    if let Some(existing) = read_live_pid(pid_file) {
        if !kill_old {
            return Err(std::io::Error::other(format!(
                "stale pid file {} names live pid {existing}",
                pid_file.display()
            )));
        }
        let _ = signal::kill(existing, Signal::SIGKILL);
    }

    let mut file = fs::File::create(pid_file)?;
    writeln!(file, "{}", std::process::id())
}

/// Parse `pid_file` and return the pid if it both parses and is
/// reachable via `kill(pid, 0)`.
fn read_live_pid(pid_file: &PathBuf) -> Option<Pid> {
    let contents = fs::read_to_string(pid_file).ok()?;
    let raw: i32 = contents.trim().parse().ok()?;
    let pid = Pid::from_raw(raw);
    signal::kill(pid, None).ok().map(|_| pid)
}

fn install_child_signal_handlers() {
    // Safety: these handlers only set a static flag and call signal-safe
    // libc functions; see `signals::child_handler`.
    unsafe {
        let action = signal::SigAction::new(
            signal::SigHandler::Handler(crate::signals::child_handler),
            signal::SaFlags::empty(),
            signal::SigSet::empty(),
        );
        let _ = signal::sigaction(Signal::SIGTERM, &action);
        let _ = signal::sigaction(Signal::SIGUSR1, &action);
        let _ = signal::sigaction(Signal::SIGINT, &signal::SigAction::new(
            signal::SigHandler::SigIgn,
            signal::SaFlags::empty(),
            signal::SigSet::empty(),
        ));
        let _ = signal::sigaction(Signal::SIGQUIT, &signal::SigAction::new(
            signal::SigHandler::SigIgn,
            signal::SaFlags::empty(),
            signal::SigSet::empty(),
        ));
    }
}

/// Best-effort process-title rename via `/proc/self/comm` (Linux only;
/// silently skipped elsewhere). Truncated to 15 bytes, the kernel's
/// `comm` length limit.
fn rename_process_title(name: &str) {
    if cfg!(target_os = "linux") {
        let truncated: String = name.chars().take(15).collect();
        let _ = fs::write("/proc/self/comm", truncated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_pid_file_checked_writes_own_pid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("child.pid");
        write_pid_file_checked(&path, false).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim().parse::<u32>().unwrap(), std::process::id());
    }

    #[test]
    fn stale_nonexistent_pid_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("child.pid");
        // pid 999999 is very unlikely to be live; kill(pid, 0) should fail.
        fs::write(&path, b"999999\n").unwrap();
        write_pid_file_checked(&path, false).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim().parse::<u32>().unwrap(), std::process::id());
    }

    #[test]
    fn live_pid_without_kill_old_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("child.pid");
        fs::write(&path, std::process::id().to_string()).unwrap();
        let err = write_pid_file_checked(&path, false).unwrap_err();
        assert!(err.to_string().contains("stale pid file"));
    }
}
