// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from loading and validating the on-disk JSON config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(std::path::PathBuf, #[source] std::io::Error),

    #[error("malformed JSON in config file {0}: {1}")]
    Json(std::path::PathBuf, #[source] serde_json::Error),
}
