// SPDX-License-Identifier: MIT

use std::fmt;

use ckp_core::{LOG_DEBUG, LOG_ERR, LOG_INFO, LOG_NOTICE, LOG_WARNING};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::logsink::LogSink;

/// Bridges `tracing` call sites to the syslog-severity `LogSink`.
///
/// `tracing::Level` only distinguishes five severities; the log sink
/// speaks the eight-level syslog scale. An event can request a finer
/// severity by attaching a `syslog` field (see `emerg`/`alert`/`crit`/
/// `notice`); absent that, the level maps via `default_syslog_level`.
pub struct LogSinkLayer {
    sink: LogSink,
}

impl LogSinkLayer {
    pub fn new(sink: LogSink) -> Self {
        LogSinkLayer { sink }
    }
}

impl<S: Subscriber> Layer<S> for LogSinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let level = visitor.syslog_override.unwrap_or_else(|| default_syslog_level(*event.metadata().level()));
        let target = event.metadata().target();
        let message = match visitor.message {
            Some(m) => format!("{target}: {m}"),
            None => target.to_string(),
        };

        self.sink.log(level, &message, visitor.error.as_deref());
    }
}

/// Map a `tracing::Level` to the syslog severity used when a call site
/// doesn't ask for a specific one via the `syslog` field.
fn default_syslog_level(level: Level) -> u8 {
    match level {
        Level::ERROR => LOG_ERR,
        Level::WARN => LOG_WARNING,
        Level::INFO => LOG_NOTICE,
        Level::DEBUG => LOG_INFO,
        Level::TRACE => LOG_DEBUG,
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    error: Option<String>,
    syslog_override: Option<u8>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{value:?}")),
            "error" => self.error = Some(format!("{value:?}")),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "error" => self.error = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "syslog" {
            self.syslog_override = u8::try_from(value).ok();
        }
    }
}

/// Log at `LOG_EMERG`: the process is about to abort. Use sparingly — this
/// is reserved for conditions that make the process unusable.
#[macro_export]
macro_rules! emerg {
    ($($arg:tt)*) => {
        ::tracing::error!(syslog = 0u64, $($arg)*)
    };
}

/// Log at `LOG_ALERT`: action must be taken immediately.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        ::tracing::error!(syslog = 1u64, $($arg)*)
    };
}

/// Log at `LOG_CRIT`: a critical condition, short of process failure.
#[macro_export]
macro_rules! crit {
    ($($arg:tt)*) => {
        ::tracing::error!(syslog = 2u64, $($arg)*)
    };
}

/// Log at `LOG_NOTICE`: normal but significant, one step quieter than the
/// default mapping for `tracing::info!`.
#[macro_export]
macro_rules! notice {
    ($($arg:tt)*) => {
        ::tracing::info!(syslog = 5u64, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    #[test]
    fn event_reaches_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layer.log");
        let sink = LogSink::open(&path, "ltest", LOG_DEBUG).unwrap();
        let layer = LogSinkLayer::new(sink);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("disk usage high");
        });

        // give the consumer thread a moment; it wakes immediately on
        // enqueue so this is generous, not load-bearing.
        std::thread::sleep(std::time::Duration::from_millis(50));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("disk usage high"));
    }

    #[test]
    fn default_mapping_covers_every_level() {
        assert_eq!(default_syslog_level(Level::ERROR), LOG_ERR);
        assert_eq!(default_syslog_level(Level::WARN), LOG_WARNING);
        assert_eq!(default_syslog_level(Level::INFO), LOG_NOTICE);
        assert_eq!(default_syslog_level(Level::DEBUG), LOG_INFO);
        assert_eq!(default_syslog_level(Level::TRACE), LOG_DEBUG);
    }
}
