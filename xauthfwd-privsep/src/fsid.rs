//! Scoped filesystem identity.
//!
//! A privileged process sometimes has to touch a file *as* another user:
//! reading a user's allow-list with that user's permissions, or creating a
//! file that the user owns. [`FsIdentityGuard`] assumes the identity for
//! its lifetime and restores the previous one when dropped, including on
//! early returns and panics.

use crate::error::IdentityError;
use crate::platform;

/// Holds an assumed filesystem identity until dropped.
#[must_use = "the identity is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct FsIdentityGuard {
    prev_uid: u32,
    prev_gid: u32,
}

impl FsIdentityGuard {
    /// Assume `uid`/`gid` for filesystem access checks.
    pub fn assume(uid: u32, gid: u32) -> Result<Self, IdentityError> {
        let (prev_uid, prev_gid) = platform::assume_fs_identity(uid, gid)
            .map_err(|source| IdentityError::Assume { uid, gid, source })?;
        Ok(Self { prev_uid, prev_gid })
    }
}

impl Drop for FsIdentityGuard {
    fn drop(&mut self) {
        platform::restore_fs_identity(self.prev_uid, self.prev_gid);
    }
}

/// Run exactly one operation with filesystem access scoped to `uid`/`gid`.
pub fn with_fs_identity<T>(
    uid: u32,
    gid: u32,
    op: impl FnOnce() -> T,
) -> Result<T, IdentityError> {
    let _guard = FsIdentityGuard::assume(uid, gid)?;
    Ok(op())
}
