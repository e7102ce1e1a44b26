//! Fallback for unix systems without filesystem ids.
//!
//! The effective ids stand in for the filesystem ids. The saved set-user-id
//! lets a privileged process switch back afterwards.

use std::io;

use super::set_cloexec_each;

pub(crate) fn set_cloexec_from(first: libc::c_int) -> io::Result<()> {
    set_cloexec_each(first)
}

pub(crate) fn assume_fs_identity(uid: u32, gid: u32) -> io::Result<(u32, u32)> {
    let prev_uid = unsafe { libc::geteuid() };
    let prev_gid = unsafe { libc::getegid() };

    if unsafe { libc::setegid(gid) } != 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::seteuid(uid) } != 0 {
        let err = io::Error::last_os_error();
        unsafe { libc::setegid(prev_gid) };
        return Err(err);
    }

    Ok((prev_uid, prev_gid))
}

pub(crate) fn restore_fs_identity(uid: u32, gid: u32) {
    unsafe {
        libc::seteuid(uid);
        libc::setegid(gid);
    }
}
