// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

/// Filesystem layout under `socket_dir` and `log_dir`.
///
/// `socket_dir` and `log_dir` are stored with a trailing slash already
/// applied, so that path joins read naturally against the on-disk layout
/// operators expect.
#[derive(Debug, Clone)]
pub struct Paths {
    socket_dir: PathBuf,
    log_dir: PathBuf,
    name: String,
}

impl Paths {
    pub fn new(socket_dir: impl Into<PathBuf>, log_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Paths { socket_dir: socket_dir.into(), log_dir: log_dir.into(), name: name.into() }
    }

    pub fn socket_dir(&self) -> &Path {
        &self.socket_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// `<socket_dir>/<name>.pid` — the supervisor's own PID file.
    pub fn own_pid_file(&self) -> PathBuf {
        self.socket_dir.join(format!("{}.pid", self.name))
    }

    /// `<socket_dir>/listener` — the supervisor's control socket.
    pub fn listener_socket(&self) -> PathBuf {
        self.socket_dir.join("listener")
    }

    /// `<socket_dir>/<child>` — a child's control socket.
    pub fn child_socket(&self, child_name: &str) -> PathBuf {
        self.socket_dir.join(child_name)
    }

    /// `<socket_dir>/<child>.pid` — a child's PID file.
    pub fn child_pid_file(&self, child_name: &str) -> PathBuf {
        self.socket_dir.join(format!("{child_name}.pid"))
    }

    /// `<log_dir>/<name>.log` — the shared log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(format!("{}.log", self.name))
    }

    /// `<log_dir>/users/`
    pub fn users_dir(&self) -> PathBuf {
        self.log_dir.join("users")
    }

    /// `<log_dir>/pool/`
    pub fn pool_dir(&self) -> PathBuf {
        self.log_dir.join("pool")
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
