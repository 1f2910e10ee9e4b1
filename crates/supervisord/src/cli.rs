// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use ckp_core::RawFlags;
use clap::Parser;

/// Command-line options, mirroring the original `getopt_long` table one
/// for one. Boolean flags feed `RawFlags`; everything else is consumed
/// directly by startup.
#[derive(Debug, Parser, Clone)]
#[command(name = "ckpoold", version, about = "mining pool supervisor")]
pub struct Cli {
    /// Disable the DB-reporting path.
    #[arg(short = 'A', long = "standalone")]
    pub standalone: bool,

    /// Solo mode: implies standalone, excludes proxy/passthrough.
    #[arg(short = 'B', long = "btcsolo")]
    pub btcsolo: bool,

    /// Config file path. Defaults to `<name>.conf` in the working directory.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Reporting-DB process name.
    #[arg(short = 'd', long = "ckdb-name")]
    pub ckdb_name: Option<String>,

    /// Chown group for control sockets.
    #[arg(short = 'g', long = "group")]
    pub group: Option<String>,

    /// Perform handover from a running instance. Implies --killold.
    #[arg(short = 'H', long = "handover")]
    pub handover: bool,

    /// SIGKILL an already-present instance with our PID files.
    #[arg(short = 'k', long = "killold")]
    pub kill_old: bool,

    /// Enable downstream share logging.
    #[arg(short = 'L', long = "log-shares")]
    pub log_shares: bool,

    /// Initial log level, 0 (emergency) through 7 (debug).
    #[arg(short = 'l', long = "loglevel", default_value_t = ckp_core::LOG_NOTICE)]
    pub loglevel: u8,

    /// Instance name; used as the process title and socket/pid basename.
    /// Defaults to `ckpool`, or `ckproxy` when `--proxy`/`--passthrough` is
    /// set and no explicit name is given.
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Passthrough proxy: implies proxy and standalone.
    #[arg(short = 'P', long = "passthrough")]
    pub passthrough: bool,

    /// Proxy mode.
    #[arg(short = 'p', long = "proxy")]
    pub proxy: bool,

    /// DB socket directory.
    #[arg(short = 'S', long = "ckdb-sockdir")]
    pub ckdb_sockdir: Option<PathBuf>,

    /// Control-socket directory. Defaults to `/tmp/<name>/`.
    #[arg(short = 's', long = "sockdir")]
    pub sockdir: Option<PathBuf>,
}

impl Cli {
    pub fn raw_flags(&self) -> RawFlags {
        RawFlags {
            standalone: self.standalone,
            btcsolo: self.btcsolo,
            proxy: self.proxy,
            passthrough: self.passthrough,
            handover: self.handover,
            kill_old: self.kill_old,
            log_shares: self.log_shares,
        }
    }

    /// `ckpool` normally, `ckproxy` when proxy/passthrough mode is in
    /// effect and no explicit `--name` was given.
    pub fn name_or_default(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None if self.proxy || self.passthrough => "ckproxy".to_string(),
            None => "ckpool".to_string(),
        }
    }

    pub fn sockdir_or_default(&self) -> PathBuf {
        self.sockdir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("/tmp/{}/", self.name_or_default())))
    }

    pub fn config_or_default(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.conf", self.name_or_default())))
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
