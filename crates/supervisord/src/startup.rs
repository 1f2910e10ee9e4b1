// SPDX-License-Identifier: MIT

use std::os::unix::fs::PermissionsExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ckp_core::{ConfigFile, Mode, Paths};
use ckp_logging::{LogSink, LogSinkLayer};
use clap::Parser;
use nix::unistd::Gid;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;

use crate::child::{launch_process, prepare_child, write_pid_file_checked, Child};
use crate::cli::Cli;
use crate::error::LifecycleError;
use crate::handover;
use crate::listener::run_listener;
use crate::signals;
use crate::state::SupervisorState;
use crate::teardown::run_teardown;
use crate::watchdog::run_watchdog;
use crate::workers;

/// Directories created under `socket_dir`/`log_dir` are 0750: readable and
/// traversable by the owner and the configured group, closed to others.
const DIR_MODE: u32 = 0o750;

/// Parse argv, bring up every child, run the control listener until
/// `shutdown`, tear down, and return the process exit code. This is the
/// entire lifetime of the supervisor process — `main` just calls this and
/// exits with what it returns.
pub fn run() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    let cli = Cli::parse_from(&args);

    match start(&cli, args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e}", cli.name_or_default());
            1
        }
    }
}

fn start(cli: &Cli, initial_args: Vec<String>) -> Result<i32, LifecycleError> {
    let mode = Mode::from_flags(cli.raw_flags())?;
    let group = cli.group.as_deref().map(resolve_group).transpose()?;
    let name = cli.name_or_default();

    let socket_dir = cli.sockdir_or_default();
    create_dir(&socket_dir)?;

    let mut config = ConfigFile::load(&cli.config_or_default()).unwrap_or_else(|e| {
        warn!("config error, continuing with defaults: {e}");
        ConfigFile::default()
    });
    config.ensure_btcd_default(mode.proxy);

    let log_dir = socket_dir.join(config.logdir.as_deref().unwrap_or("logs"));
    create_dir(&log_dir)?;

    let paths = Paths::new(socket_dir.clone(), log_dir, name.clone());
    create_dir(&paths.users_dir())?;
    create_dir(&paths.pool_dir())?;

    let sink = LogSink::open(&paths.log_file(), &name, cli.loglevel)?;
    let log_level = sink.level();
    let subscriber = tracing_subscriber::registry().with(LogSinkLayer::new(sink));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("a global tracing subscriber was already installed");
    }

    // Handover happens before this generation writes its own PID file: the
    // old generation must still be reachable on `listener_path` when we ask
    // it for the connector's fd.
    let listener_path = paths.listener_socket();
    let inherited_fd = if mode.handover {
        info!("handover requested, contacting previous generation");
        Some(handover::perform_handover(&listener_path)?)
    } else {
        None
    };

    let own_pid_file = paths.own_pid_file();
    write_pid_file_checked(&own_pid_file, mode.kill_old)
        .map_err(|e| LifecycleError::PidFile(own_pid_file.clone(), e))?;

    let mut children = vec![
        prepare_child(&paths, group, "generator", "generator", workers::generator_entry)?,
        prepare_child(&paths, group, "stratifier", "stratifier", workers::stratifier_entry)?,
        prepare_child(&paths, group, "connector", "connector", workers::connector_entry)?,
    ];
    launch_all(
        &mut children,
        &paths,
        group,
        cli.loglevel,
        mode.kill_old,
        inherited_fd,
        config.serverurl.clone(),
    )?;

    let own_listener = ckp_wire::open_unix_server(&listener_path, group)
        .map_err(|e| LifecycleError::Bind(listener_path.clone(), e))?;

    let state = Arc::new(SupervisorState::new(
        name,
        paths,
        mode,
        group,
        log_level,
        children,
        initial_args,
        config.serverurl.clone(),
    ));

    signals::install_supervisor_signal_handlers().map_err(LifecycleError::Signal)?;
    // Not joined: once `run_listener` returns (whether it was this thread's
    // own `shutdown` or one relayed from a signal), the process is on its
    // way down anyway. Joining here would hang if shutdown arrived via the
    // control socket instead of a signal, since the bridge only wakes on
    // `TERM_REQUESTED`.
    let _bridge = signals::spawn_signal_bridge(state.paths.listener_socket())?;

    let cancel_watchdog = Arc::new(AtomicBool::new(false));
    let watchdog_state = Arc::clone(&state);
    let watchdog_cancel = Arc::clone(&cancel_watchdog);
    let watchdog = std::thread::Builder::new()
        .name("watchdog".to_string())
        .spawn(move || run_watchdog(&watchdog_state, &watchdog_cancel))?;

    info!("supervisor up, accepting control connections");
    run_listener(&state, &own_listener);

    cancel_watchdog.store(true, Ordering::SeqCst);
    let _ = watchdog.join();
    run_teardown(&state);

    Ok(0)
}

#[allow(clippy::too_many_arguments)]
fn launch_all(
    children: &mut [Child],
    paths: &Paths,
    group: Option<Gid>,
    loglevel: u8,
    kill_old: bool,
    inherited_fd: Option<std::os::fd::OwnedFd>,
    serverurl: Option<String>,
) -> Result<(), LifecycleError> {
    let mut inherited_fd = inherited_fd;
    for child in children.iter_mut() {
        let fd = if child.name == "connector" { inherited_fd.take() } else { None };
        let url = if child.name == "connector" { serverurl.clone() } else { None };
        if let Err(e) = launch_process(child, paths, group, loglevel, kill_old, fd, url) {
            error!("failed to launch {}: {e}", child.name);
            return Err(e);
        }
    }
    Ok(())
}

fn resolve_group(name: &str) -> Result<Gid, LifecycleError> {
    nix::unistd::Group::from_name(name)
        .map_err(|_| LifecycleError::InvalidGroup(name.to_string()))?
        .map(|group| group.gid)
        .ok_or_else(|| LifecycleError::InvalidGroup(name.to_string()))
}

fn create_dir(path: &std::path::Path) -> Result<(), LifecycleError> {
    std::fs::create_dir_all(path).map_err(|e| LifecycleError::CreateDir(path.to_path_buf(), e))?;
    let perms = std::fs::Permissions::from_mode(DIR_MODE);
    std::fs::set_permissions(path, perms).map_err(|e| LifecycleError::CreateDir(path.to_path_buf(), e))
}
