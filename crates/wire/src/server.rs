// SPDX-License-Identifier: MIT

use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;

use nix::unistd::Gid;
use tracing::debug;

use crate::WireError;

/// Unlink any stale socket node, bind, and listen. Fatal at startup on
/// failure — callers should treat `Err` as unrecoverable.
/// When `group` is set, both the socket node and its parent directory are
/// `chown`-ed to that group so the configured operator group can reach it.
pub fn open_unix_server(path: &Path, group: Option<Gid>) -> Result<UnixListener, WireError> {
    debug!(path = %path.display(), "opening unix server socket");
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    let listener = UnixListener::bind(path)?;

    if let Some(gid) = group {
        nix::unistd::chown(path, None, Some(gid))?;
        if let Some(parent) = path.parent() {
            nix::unistd::chown(parent, None, Some(gid))?;
        }
    }

    Ok(listener)
}

/// Connect to a control socket. Callers must close on every exit path —
/// in Rust this falls out of RAII `Drop`, so no explicit close is needed,
/// but the stream must not be leaked into a long-lived structure past the
/// request/response exchange it was opened for.
pub fn open_unix_client(path: &Path) -> Result<UnixStream, WireError> {
    Ok(UnixStream::connect(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn server_unlinks_stale_node_and_binds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ctl.sock");
        std::fs::write(&path, b"stale").unwrap();

        let listener = open_unix_server(&path, None).unwrap();
        assert!(path.exists());
        drop(listener);
    }

    #[test]
    fn client_connects_to_server() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ctl.sock");
        let _listener = open_unix_server(&path, None).unwrap();

        let client = open_unix_client(&path);
        assert!(client.is_ok());
    }

    #[test]
    fn client_fails_without_server() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.sock");
        assert!(open_unix_client(&path).is_err());
    }
}
