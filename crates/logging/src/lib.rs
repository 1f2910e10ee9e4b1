// SPDX-License-Identifier: MIT

//! The supervisor's logging stack: a `MsgQueue`-backed sink that owns the
//! shared log file, and a `tracing_subscriber::Layer` that routes every
//! `tracing` call site into it under a syslog-style 0..7 severity.
//!
//! Call sites use ordinary `tracing::{error,warn,info,debug,trace}!`
//! macros, which map onto the syslog scale via `default_syslog_level`, or
//! the finer-grained `emerg!`/`alert!`/`crit!`/`notice!` macros exported
//! from this crate when a call site needs a severity `tracing::Level`
//! doesn't distinguish.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod layer;
mod logsink;
mod msgqueue;

pub use layer::LogSinkLayer;
pub use logsink::{LogLevel, LogSink};
pub use msgqueue::MsgQueue;
