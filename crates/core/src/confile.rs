// SPDX-License-Identifier: MIT

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, DONATION_ADDRESS, MAX_BTCSIG_LEN};

/// A single upstream endpoint: bitcoind (`btcd`) or an upstream proxy
/// (`proxy`). Both arrays share this shape in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
}

impl Endpoint {
    /// Fill in the stock defaults for an unconfigured btcd entry:
    /// `localhost:8332` / `user` / `pass`.
    fn with_btcd_defaults(mut self) -> Self {
        self.url.get_or_insert_with(|| "localhost:8332".to_string());
        self.auth.get_or_insert_with(|| "user".to_string());
        self.pass.get_or_insert_with(|| "pass".to_string());
        self
    }
}

/// The on-disk JSON config file. Unknown keys are ignored by `serde`'s
/// default struct deserialization; malformed JSON is reported by
/// `ConfigFile::load` rather than being fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub btcd: Vec<Endpoint>,
    #[serde(default)]
    pub proxy: Vec<Endpoint>,
    #[serde(default)]
    pub btcaddress: Option<String>,
    #[serde(default)]
    pub btcsig: Option<String>,
    #[serde(default)]
    pub blockpoll: Option<u64>,
    #[serde(default)]
    pub update_interval: Option<u64>,
    #[serde(default)]
    pub serverurl: Option<String>,
    #[serde(default)]
    pub mindiff: Option<i64>,
    #[serde(default)]
    pub startdiff: Option<i64>,
    #[serde(default)]
    pub logdir: Option<String>,
}

impl ConfigFile {
    /// Load and apply defaults. A missing file is treated as an empty
    /// config (defaults apply); a present-but-malformed file is reported
    /// through `ConfigError::Json` — callers log this as a warning and
    /// continue with defaults rather than failing startup over a bad
    /// config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default().with_defaults());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let parsed: ConfigFile = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Json(path.to_path_buf(), e))?;
        Ok(parsed.with_defaults())
    }

    /// Fill in a single default `btcd` entry when none was configured and
    /// `proxy` mode is not in effect. Checks the resolved `--proxy` mode
    /// flag, not the config file's `proxy` array, before deciding whether
    /// a bitcoind entry is required. Called by the supervisor once `Mode`
    /// has been resolved from argv, since `ConfigFile` itself has no
    /// notion of CLI flags.
    pub fn ensure_btcd_default(&mut self, proxy_mode: bool) {
        if self.btcd.is_empty() && !proxy_mode {
            self.btcd.push(Endpoint::default());
        }
        self.btcd = std::mem::take(&mut self.btcd)
            .into_iter()
            .map(Endpoint::with_btcd_defaults)
            .collect();
    }

    /// Apply defaults for every key absent from the file, and truncate an
    /// oversized `btcsig`.
    fn with_defaults(mut self) -> Self {
        if let Some(sig) = &mut self.btcsig {
            if sig.len() > MAX_BTCSIG_LEN {
                // Truncate on raw bytes, as the original `parse_config`
                // does with a fixed-size char array; `sig.len()` counts
                // bytes, and `MAX_BTCSIG_LEN` may fall in the middle of a
                // multi-byte char, so go through `from_utf8_lossy` rather
                // than `String::truncate`, which panics off a char
                // boundary.
                let bytes = &sig.as_bytes()[..MAX_BTCSIG_LEN];
                *sig = String::from_utf8_lossy(bytes).into_owned();
            }
        }

        self.btcaddress.get_or_insert_with(|| DONATION_ADDRESS.to_string());
        self.blockpoll.get_or_insert(500);
        self.update_interval.get_or_insert(30);
        self.mindiff.get_or_insert(1);
        self.startdiff.get_or_insert(42);
        self.logdir.get_or_insert_with(|| "logs".to_string());

        self
    }
}

#[cfg(test)]
#[path = "confile_tests.rs"]
mod tests;
