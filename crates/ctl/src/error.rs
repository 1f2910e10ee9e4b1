// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Every failure this client can hit maps to exit code 1; this type exists
/// only to give `main` a readable diagnostic to print first.
#[derive(Debug, Error)]
pub enum CtlError {
    #[error("failed to connect to {0}: {1}")]
    Connect(std::path::PathBuf, #[source] ckp_wire::WireError),

    #[error("failed to send command: {0}")]
    Send(#[source] ckp_wire::WireError),

    #[error("failed to read reply: {0}")]
    Recv(#[source] ckp_wire::WireError),
}
