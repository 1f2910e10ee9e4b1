// SPDX-License-Identifier: MIT

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal startup errors: any of these abort the process with exit code 1.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to create directory {0}: {1}")]
    CreateDir(PathBuf, #[source] io::Error),

    #[error("failed to bind control socket {0}: {1}")]
    Bind(PathBuf, #[source] ckp_wire::WireError),

    #[error("instance already running with pid {0} (use -k to kill it)")]
    AlreadyRunning(i32),

    #[error("failed to read/write pid file {0}: {1}")]
    PidFile(PathBuf, #[source] io::Error),

    #[error("bad configuration: {0}")]
    Config(#[from] ckp_core::ConfigError),

    #[error("bad operating mode: {0}")]
    Mode(#[from] ckp_core::ModeError),

    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),

    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] nix::Error),

    #[error("handover failed: {0}")]
    Handover(String),

    #[error("unknown group {0:?}")]
    InvalidGroup(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
