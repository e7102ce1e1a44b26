//! OS-specific privilege and descriptor operations.

use std::io;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub(crate) use linux::{assume_fs_identity, restore_fs_identity, set_cloexec_from};

#[cfg(not(target_os = "linux"))]
mod generic;
#[cfg(not(target_os = "linux"))]
pub(crate) use generic::{assume_fs_identity, restore_fs_identity, set_cloexec_from};

/// Mark every open descriptor from `first` upwards close-on-exec, one
/// `fcntl` at a time.
///
/// Runs between fork and exec, so it must not allocate.
pub(crate) fn set_cloexec_each(first: libc::c_int) -> io::Result<()> {
    let max = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) };
    let max = if max <= 0 {
        1024
    } else {
        max.min(libc::c_int::MAX as libc::c_long) as libc::c_int
    };

    for fd in first..max {
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
        if flags < 0 || flags & libc::FD_CLOEXEC != 0 {
            continue;
        }
        if unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) } < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
