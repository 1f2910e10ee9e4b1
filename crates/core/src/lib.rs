// SPDX-License-Identifier: MIT

//! Shared data model for the ckpool-rs supervisor.
//!
//! This crate holds the parts of the supervisor's state that are pure data:
//! operating-mode flags, the on-disk config schema, syslog-style log levels,
//! and the filesystem layout under `socket_dir`/`log_dir`. It has no
//! knowledge of sockets, threads, or processes — those live in `ckp-wire`
//! and `ckp-supervisord`.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod confile;
mod error;
mod mode;
mod paths;
mod syslog;

pub use confile::{ConfigFile, Endpoint};
pub use error::ConfigError;
pub use mode::{Mode, ModeError};
pub use paths::Paths;
pub use syslog::{
    is_valid_level, LOG_ALERT, LOG_CRIT, LOG_DEBUG, LOG_EMERG, LOG_ERR, LOG_INFO, LOG_NOTICE,
    LOG_WARNING,
};

/// Donation address used as the default `btcaddress` when the config file
/// doesn't set one.
pub const DONATION_ADDRESS: &str = "1PKN98VN2z5gwSGZvGKS2bj8aADZBkyhkZ";

/// `btcsig` longer than this is truncated with a warning.
pub const MAX_BTCSIG_LEN: usize = 38;

