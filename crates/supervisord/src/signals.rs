// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Set by `supervisor_handler` on SIGTERM/SIGINT. Polled by the signal
/// bridge thread rather than acted on directly inside the handler, which
/// keeps the handler itself async-signal-safe (a single relaxed store).
static TERM_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn supervisor_handler(_signum: i32) {
    TERM_REQUESTED.store(true, Ordering::SeqCst);
}

/// Forward every signal except `SIGUSR1` to the parent, then exit. This is
/// the topology that makes `Ctrl-C` on any worker converge on the
/// supervisor: workers never tear themselves down directly.
pub extern "C" fn child_handler(signum: i32) {
    if signum != Signal::SIGUSR1 as i32 {
        if let Ok(sig) = Signal::try_from(signum) {
            let _ = signal::kill(nix::unistd::getppid(), sig);
        }
    }
    // _exit, not exit: skips atexit handlers, which is what we want from
    // inside a signal handler.
    nix::unistd::_exit(0);
}

/// Install the supervisor's own signal disposition: SIGTERM/SIGINT set
/// `TERM_REQUESTED`; SIGQUIT and SIGPIPE are ignored process-wide.
pub fn install_supervisor_signal_handlers() -> Result<(), nix::Error> {
    // Safety: `supervisor_handler` only performs an atomic store, which is
    // async-signal-safe.
    unsafe {
        let action =
            SigAction::new(SigHandler::Handler(supervisor_handler), SaFlags::empty(), SigSet::empty());
        signal::sigaction(Signal::SIGTERM, &action)?;
        signal::sigaction(Signal::SIGINT, &action)?;

        let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        signal::sigaction(Signal::SIGQUIT, &ignore)?;
        signal::sigaction(Signal::SIGPIPE, &ignore)?;
    }
    Ok(())
}

pub fn term_requested() -> bool {
    TERM_REQUESTED.load(Ordering::SeqCst)
}

/// Spawn a thread that polls `TERM_REQUESTED` and, once set, sends
/// `shutdown` to the supervisor's own control socket — routing signal
/// delivery through the same teardown path as an operator-issued
/// `shutdown` command instead of duplicating teardown logic in the
/// handler.
pub fn spawn_signal_bridge(listener_path: PathBuf) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name("sigbridge".to_string()).spawn(move || loop {
        if TERM_REQUESTED.load(Ordering::SeqCst) {
            if let Ok(mut stream) = ckp_wire::open_unix_client(&listener_path) {
                let _ = ckp_wire::send_msg(&mut stream, b"shutdown");
            }
            return;
        }
        thread::sleep(Duration::from_millis(200));
    })
}
