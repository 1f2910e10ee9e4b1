// SPDX-License-Identifier: MIT

use std::os::fd::OwnedFd;
use std::path::Path;

use tracing::info;

use crate::error::LifecycleError;

/// Performs the pre-fork handover dance against a still-running previous
/// generation: ask for the connector's listening fd, then tell it to shut
/// down. The old generation's accept loop must be gone before the new
/// generation's connector starts accepting — sending `shutdown` here, and
/// having the old generation's teardown run to completion before this
/// function returns control to the caller's startup sequence, is what
/// keeps that handoff race-free.
pub fn perform_handover(listener_path: &Path) -> Result<OwnedFd, LifecycleError> {
    let mut request_sock = ckp_wire::open_unix_client(listener_path)
        .map_err(|_| LifecycleError::Handover(format!("cannot reach {}", listener_path.display())))?;

    ckp_wire::send_msg(&mut request_sock, b"getfd")
        .map_err(|e| LifecycleError::Handover(format!("getfd send failed: {e}")))?;
    let fd = ckp_wire::recv_fd(&request_sock)
        .map_err(|e| LifecycleError::Handover(format!("getfd recv failed: {e}")))?;
    drop(request_sock);

    let mut shutdown_sock = ckp_wire::open_unix_client(listener_path)
        .map_err(|e| LifecycleError::Handover(format!("cannot reconnect for shutdown: {e}")))?;
    ckp_wire::send_msg(&mut shutdown_sock, b"shutdown")
        .map_err(|e| LifecycleError::Handover(format!("shutdown send failed: {e}")))?;

    info!("handover complete, inherited listening fd from previous generation");
    Ok(fd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn handover_against_missing_listener_fails_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listener");
        let err = perform_handover(&path).unwrap_err();
        assert!(matches!(err, LifecycleError::Handover(_)));
    }
}
