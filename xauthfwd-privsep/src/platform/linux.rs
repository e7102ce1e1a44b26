//! Linux implementation.

use std::io;

use super::set_cloexec_each;

/// `CLOSE_RANGE_CLOEXEC` from <linux/close_range.h>.
const CLOSE_RANGE_CLOEXEC: libc::c_uint = 1 << 2;

/// Mark descriptors `first..` close-on-exec.
///
/// Uses a single close_range(2) call; kernels older than 5.11 reject the
/// flag, in which case every descriptor is flagged individually.
pub(crate) fn set_cloexec_from(first: libc::c_int) -> io::Result<()> {
    let rc = unsafe {
        libc::syscall(
            libc::SYS_close_range,
            first as libc::c_uint,
            libc::c_uint::MAX,
            CLOSE_RANGE_CLOEXEC,
        )
    };
    if rc == 0 {
        return Ok(());
    }
    set_cloexec_each(first)
}

/// Switch the filesystem uid/gid, returning the previous pair.
///
/// setfsuid(2) reports failure only by leaving the id unchanged, so the
/// result is read back and compared.
pub(crate) fn assume_fs_identity(uid: u32, gid: u32) -> io::Result<(u32, u32)> {
    let prev_gid = unsafe { libc::setfsgid(gid) } as u32;
    let prev_uid = unsafe { libc::setfsuid(uid) } as u32;

    let now_uid = unsafe { libc::setfsuid(libc::uid_t::MAX) } as u32;
    let now_gid = unsafe { libc::setfsgid(libc::gid_t::MAX) } as u32;
    if now_uid != uid || now_gid != gid {
        restore_fs_identity(prev_uid, prev_gid);
        return Err(io::Error::from(io::ErrorKind::PermissionDenied));
    }

    Ok((prev_uid, prev_gid))
}

/// Return to a filesystem uid/gid obtained from [`assume_fs_identity`].
pub(crate) fn restore_fs_identity(uid: u32, gid: u32) {
    unsafe {
        libc::setfsuid(uid);
        libc::setfsgid(gid);
    }
}
