// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Raw CLI flags as parsed from argv, before cross-flag validation and
/// implication is applied. See `Mode::from_flags`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFlags {
    pub standalone: bool,
    pub btcsolo: bool,
    pub proxy: bool,
    pub passthrough: bool,
    pub handover: bool,
    pub kill_old: bool,
    pub log_shares: bool,
}

/// The supervisor's closed set of operating-mode flags, with the
/// documented exclusions and implications already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub standalone: bool,
    pub proxy: bool,
    pub passthrough: bool,
    pub btcsolo: bool,
    pub handover: bool,
    pub kill_old: bool,
    pub log_shares: bool,
}

/// Mutually-exclusive mode flags were requested together.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("cannot set both proxy and passthrough mode")]
    ProxyAndPassthrough,

    #[error("cannot set both proxy and btcsolo mode")]
    ProxyAndBtcsolo,
}

impl Mode {
    /// Validate and resolve implications:
    /// - `-B`/`--btcsolo` implies `standalone`; excludes `proxy`/`passthrough`.
    /// - `-P`/`--passthrough` implies `proxy` and `standalone`; excludes a
    ///   separately-requested `btcsolo`.
    /// - `-p`/`--proxy` excludes `passthrough` set independently of it.
    /// - `-H`/`--handover` implies `kill_old`.
    pub fn from_flags(raw: RawFlags) -> Result<Self, ModeError> {
        if raw.proxy && raw.passthrough {
            return Err(ModeError::ProxyAndPassthrough);
        }
        if raw.btcsolo && (raw.proxy || raw.passthrough) {
            return Err(ModeError::ProxyAndBtcsolo);
        }

        let passthrough = raw.passthrough;
        let proxy = raw.proxy || passthrough;
        let standalone = raw.standalone || raw.btcsolo || passthrough;
        let kill_old = raw.kill_old || raw.handover;

        Ok(Mode {
            standalone,
            proxy,
            passthrough,
            btcsolo: raw.btcsolo,
            handover: raw.handover,
            kill_old,
            log_shares: raw.log_shares,
        })
    }
}

#[cfg(test)]
#[path = "mode_tests.rs"]
mod tests;
