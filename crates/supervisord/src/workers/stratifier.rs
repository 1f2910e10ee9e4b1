// SPDX-License-Identifier: MIT

use ckp_logging::LogSinkLayer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

use crate::child::ChildContext;

use super::serve_control_loop;

/// The stratifier speaks the stratum protocol to downstream miners, which
/// is out of scope here; this entry point establishes the same contract
/// as every other worker: its own log sink and a control socket.
pub fn run(ctx: ChildContext) -> i32 {
    let sink = match ckp_logging::LogSink::open(&ctx.paths.log_file(), "slogger", ctx.initial_loglevel) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("stratifier: failed to open log sink: {e}");
            return 1;
        }
    };
    let level = sink.level();
    let subscriber = tracing_subscriber::registry().with(LogSinkLayer::new(sink));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("stratifier: a global tracing subscriber was already installed");
    }

    info!("stratifier started");
    serve_control_loop(&ctx, &level, |_cmd, _stream| false)
}
