// SPDX-License-Identifier: MIT

use ckp_logging::LogSinkLayer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

use crate::child::ChildContext;

use super::serve_control_loop;

/// The generator's block-template construction is out of scope here; this
/// entry point only establishes the contract the supervisor relies on:
/// its own log sink, a control socket that answers administrative
/// commands, and a clean exit on `shutdown`.
pub fn run(ctx: ChildContext) -> i32 {
    let sink = match ckp_logging::LogSink::open(&ctx.paths.log_file(), "glogger", ctx.initial_loglevel) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("generator: failed to open log sink: {e}");
            return 1;
        }
    };
    let level = sink.level();
    let subscriber = tracing_subscriber::registry().with(LogSinkLayer::new(sink));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("generator: a global tracing subscriber was already installed");
    }

    info!("generator started");
    serve_control_loop(&ctx, &level, |_cmd, _stream| false)
}
