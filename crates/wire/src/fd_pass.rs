// SPDX-License-Identifier: MIT

use std::io::IoSlice;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::sys::socket::{
    self, ControlMessage, ControlMessageOwned, MsgFlags, RecvMsg,
};
use nix::sys::uio::IoSliceMut;

use crate::WireError;

/// One arbitrary byte sent alongside the ancillary data — `sendmsg`/
/// `recvmsg` both require at least one byte of regular payload even when
/// the interesting content is the control message.
const MARKER_BYTE: [u8; 1] = [0u8];

/// Send exactly one file descriptor over `sock` via `SCM_RIGHTS` ancillary
/// data. `fd` is borrowed — the caller keeps ownership and is responsible
/// for closing it.
pub fn send_fd(fd: RawFd, sock: impl AsRawFd) -> Result<(), WireError> {
    let iov = [IoSlice::new(&MARKER_BYTE)];
    let fds = [fd];
    let cmsg = [ControlMessage::ScmRights(&fds)];
    socket::sendmsg::<()>(sock.as_raw_fd(), &iov, &cmsg, MsgFlags::empty(), None)?;
    Ok(())
}

/// Receive exactly one file descriptor from `sock` via ancillary data,
/// mirroring `send_fd`. Returns an owned descriptor the caller is
/// responsible for closing (or adopting into a typed socket/file).
pub fn recv_fd(sock: impl AsRawFd) -> Result<OwnedFd, WireError> {
    let mut marker = [0u8; 1];
    let mut iov = [IoSliceMut::new(&mut marker)];
    let mut cmsg_buffer = nix::cmsg_space!([RawFd; 1]);

    let msg: RecvMsg<()> = socket::recvmsg(
        sock.as_raw_fd(),
        &mut iov,
        Some(&mut cmsg_buffer),
        MsgFlags::empty(),
    )?;

    for cmsg in msg.cmsgs()? {
        if let ControlMessageOwned::ScmRights(fds) = cmsg {
            if let Some(&raw) = fds.first() {
                // Safety: the kernel just handed us a freshly-dup'd fd in
                // this recvmsg call; we are its sole owner.
                let fd = unsafe { OwnedFd::from_raw_fd(raw) };
                return Ok(fd);
            }
        }
    }
    Err(WireError::BadAncillaryData)
}
