// SPDX-License-Identifier: MIT

use ckp_core::{Mode, Paths};
use ckp_logging::LogLevel;
use nix::unistd::Gid;
use parking_lot::Mutex;

use crate::child::Child;

/// The supervisor's process-wide state: one instance, constructed once at
/// startup, shared (via `Arc`) between the listener and watchdog threads.
pub struct SupervisorState {
    pub name: String,
    pub paths: Paths,
    pub mode: Mode,
    pub group: Option<Gid>,
    pub log_level: LogLevel,
    pub children: Mutex<Vec<Child>>,
    /// Verbatim argv captured at startup, used to re-exec on `restart`.
    pub initial_args: Vec<String>,
    /// The config file's `serverurl`, passed to the connector on respawn.
    pub serverurl: Option<String>,
}

impl SupervisorState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        paths: Paths,
        mode: Mode,
        group: Option<Gid>,
        log_level: LogLevel,
        children: Vec<Child>,
        initial_args: Vec<String>,
        serverurl: Option<String>,
    ) -> Self {
        SupervisorState {
            name,
            paths,
            mode,
            group,
            log_level,
            children: Mutex::new(children),
            initial_args,
            serverurl,
        }
    }
}
