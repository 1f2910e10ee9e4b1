// SPDX-License-Identifier: MIT

use std::net::TcpListener;
use std::os::fd::AsRawFd;

use ckp_logging::LogSinkLayer;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;

use crate::child::ChildContext;

use super::serve_control_loop;

/// Fallback bind address when not adopting a handed-over listener and the
/// config has no `serverurl` set.
const DEFAULT_BIND: &str = "0.0.0.0:3333";

/// The connector accepts client TCP connections and answers `getfd` with
/// its listening socket so a new generation can adopt it during handover.
/// Speaking to connected clients is the stratifier's job and out of scope
/// here.
pub fn run(ctx: ChildContext) -> i32 {
    let sink = match ckp_logging::LogSink::open(&ctx.paths.log_file(), "clogger", ctx.initial_loglevel) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("connector: failed to open log sink: {e}");
            return 1;
        }
    };
    let level = sink.level();
    let subscriber = tracing_subscriber::registry().with(LogSinkLayer::new(sink));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("connector: a global tracing subscriber was already installed");
    }

    let listener = match ctx.inherited_listen_fd {
        Some(fd) => {
            info!("connector adopting inherited listening socket");
            TcpListener::from(fd)
        }
        None => {
            let bind_addr = ctx.serverurl.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_BIND);
            match TcpListener::bind(bind_addr) {
                Ok(listener) => listener,
                Err(e) => {
                    error!("connector: failed to bind {bind_addr}: {e}");
                    return 1;
                }
            }
        }
    };

    info!("connector listening");
    serve_control_loop(&ctx, &level, |cmd, stream| {
        if cmd == "getfd" {
            if let Err(e) = ckp_wire::send_fd(listener.as_raw_fd(), &*stream) {
                error!("connector: failed to hand off listening fd: {e}");
            }
            true
        } else {
            false
        }
    })
}
