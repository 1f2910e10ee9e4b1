// SPDX-License-Identifier: MIT

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use ckp_core::{LOG_DEBUG, LOG_EMERG, LOG_ERR, LOG_WARNING};
use fs2::FileExt;

use crate::msgqueue::MsgQueue;

/// Current log level, read by every producer before formatting a message
/// and written by the listener thread on `loglevel=N`. `Relaxed` ordering
/// is sufficient here: a torn or stale read only costs an extra or missed
/// line at the boundary, never a crash.
#[derive(Clone)]
pub struct LogLevel(Arc<AtomicU8>);

impl LogLevel {
    pub fn new(initial: u8) -> Self {
        LogLevel(Arc::new(AtomicU8::new(initial.min(LOG_DEBUG))))
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, level: u8) {
        self.0.store(level.min(LOG_DEBUG), Ordering::Relaxed);
    }
}

/// The per-process log sink: a `MsgQueue` whose consumer writes
/// pre-formatted lines to the shared log file under an advisory exclusive
/// lock. Never inherited across `fork` — each process (supervisor and
/// every child) constructs its own at entry.
pub struct LogSink {
    queue: MsgQueue<String>,
    level: LogLevel,
}

impl LogSink {
    /// Open (creating if necessary) the log file at `log_path` in append
    /// mode and spawn the consumer thread. `name` becomes the consumer
    /// thread's name, e.g. `"glogger"` for the generator.
    pub fn open(log_path: &Path, name: &str, initial_level: u8) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(log_path)?;
        let level = LogLevel::new(initial_level);
        let queue = MsgQueue::create(name, move |line: String| write_locked(&file, &line))?;
        Ok(LogSink { queue, level })
    }

    pub fn level(&self) -> LogLevel {
        self.level.clone()
    }

    /// Format and enqueue a line if `level` is within the current
    /// threshold. Timestamps every line, appends `error_detail` for
    /// `level <= LOG_ERR`, and mirrors to stderr synchronously (by the
    /// producer, not the consumer) for `level <= LOG_WARNING`.
    pub fn log(&self, level: u8, message: &str, error_detail: Option<&str>) {
        if level > self.level.get() {
            return;
        }
        if message.is_empty() {
            eprintln!("Log sink received zero length message");
            return;
        }

        let stamp = chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]");
        let line = if level <= LOG_ERR {
            match error_detail {
                Some(detail) => format!("{stamp} {message} with error: {detail}"),
                None => format!("{stamp} {message}"),
            }
        } else {
            format!("{stamp} {message}")
        };

        if level <= LOG_WARNING {
            eprintln!("{line}");
        }

        self.queue.enqueue(format!("{line}\n"));
    }

    pub fn emerg(&self, message: &str) {
        self.log(LOG_EMERG, message, None);
    }

    pub fn shutdown(self) {
        self.queue.shutdown();
    }
}

fn write_locked(file: &File, line: &str) {
    if file.lock_exclusive().is_err() {
        eprintln!("failed to acquire log file lock; writing unlocked");
    }
    let mut handle = file;
    if let Err(e) = handle.write_all(line.as_bytes()) {
        eprintln!("failed to write log line: {e}");
    }
    let _ = fs2::FileExt::unlock(file);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_formatted_line_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");
        let sink = LogSink::open(&path, "tlogger", LOG_DEBUG).unwrap();
        sink.log(ckp_core::LOG_NOTICE, "hello there", None);
        sink.shutdown();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("hello there"));
        assert!(contents.starts_with('['));
    }

    #[test]
    fn messages_above_log_level_are_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");
        let sink = LogSink::open(&path, "tlogger2", ckp_core::LOG_WARNING).unwrap();
        sink.log(ckp_core::LOG_DEBUG, "should be dropped", None);
        sink.log(ckp_core::LOG_WARNING, "should appear", None);
        sink.shutdown();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("should be dropped"));
        assert!(contents.contains("should appear"));
    }

    #[test]
    fn level_broadcast_takes_effect_at_runtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");
        let sink = LogSink::open(&path, "tlogger3", ckp_core::LOG_NOTICE).unwrap();
        let level = sink.level();

        sink.log(ckp_core::LOG_DEBUG, "before raise", None);
        level.set(ckp_core::LOG_DEBUG);
        sink.log(ckp_core::LOG_DEBUG, "after raise", None);
        sink.shutdown();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("before raise"));
        assert!(contents.contains("after raise"));
    }
}
