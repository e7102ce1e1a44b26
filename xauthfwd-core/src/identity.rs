//! Identity types for the two parties of a forwarding session.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A resolved user account.
///
/// Resolved fresh on every session open and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
    pub username: String,
}

impl Identity {
    pub fn new(uid: u32, gid: u32, home: impl Into<PathBuf>, username: impl Into<String>) -> Self {
        Self {
            uid,
            gid,
            home: home.into(),
            username: username.into(),
        }
    }

    /// Home directory of the account.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Returns true for the superuser.
    pub fn is_root(&self) -> bool {
        self.uid == 0
    }
}

/// Real user and group ids of the process invoking the session.
///
/// The authority tool reading the invoker's cookie runs under these ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub uid: u32,
    pub gid: u32,
}

impl Caller {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Returns true if the caller runs as the superuser.
    pub fn is_root(&self) -> bool {
        self.uid == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_accessors() {
        let id = Identity::new(1000, 1000, "/home/alice", "alice");
        assert_eq!(id.home(), Path::new("/home/alice"));
        assert_eq!(id.username, "alice");
        assert!(!id.is_root());
        assert!(Identity::new(0, 0, "/root", "root").is_root());
    }

    #[test]
    fn identity_json_shape() {
        let id = Identity::new(1001, 100, "/home/bob", "bob");
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["uid"], 1001);
        assert_eq!(json["home"], "/home/bob");
        assert_eq!(json["username"], "bob");
    }

    #[test]
    fn caller_root() {
        assert!(Caller::new(0, 0).is_root());
        assert!(!Caller::new(1000, 0).is_root());
    }
}
