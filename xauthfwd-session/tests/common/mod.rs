//! Shared fixture for session engine tests.
//!
//! Every account in the fixture maps to the test process's own uid/gid, so
//! the privilege switches are real but never need root. Homes live in a
//! temporary directory.

#![allow(dead_code)]

use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::TempDir;
use xauthfwd_core::{Caller, Identity, SessionConfig};
use xauthfwd_session::{IdentityResolver, ResolveError};

/// Stand-in for xauth: entries are `<display> <cookie>` lines.
const STUB_XAUTH: &str = r#"#!/bin/sh
[ "$1" = "-f" ] || exit 2
file=$2
case "$3" in
nlist)
    [ -f "$file" ] || exit 1
    awk -v d="$4" '$1 == d' "$file"
    ;;
nmerge)
    [ "$4" = "-" ] || exit 2
    cat >> "$file"
    ;;
*)
    exit 2
    ;;
esac
"#;

/// Stand-in that also records which uid ran the merge, in `<file>.merged-by`.
const RECORDING_XAUTH: &str = r#"#!/bin/sh
case "$3" in
nlist) awk -v d="$4" '$1 == d' "$2" ;;
nmerge) cat >> "$2" && id -u > "$2.merged-by" ;;
esac
"#;

/// Stand-in whose merge consumes the cookie but writes nothing.
const BROKEN_MERGE_XAUTH: &str = r#"#!/bin/sh
case "$3" in
nlist) awk -v d="$4" '$1 == d' "$2" ;;
nmerge) cat > /dev/null; exit 1 ;;
esac
"#;

pub struct MapResolver {
    pub by_name: HashMap<String, Identity>,
    pub by_uid: HashMap<u32, Identity>,
}

impl IdentityResolver for MapResolver {
    fn by_name(&self, name: &str) -> Result<Identity, ResolveError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))
    }

    fn by_uid(&self, uid: u32) -> Result<Identity, ResolveError> {
        self.by_uid
            .get(&uid)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(format!("uid {uid}")))
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub caller: Caller,
    pub alice: Identity,
    pub bob: Identity,
    pub tool: PathBuf,
    pub broken_tool: PathBuf,
    pub recording_tool: PathBuf,
}

impl Fixture {
    /// alice invokes, bob is the target. alice's export list names bob so
    /// the default for a root caller does not matter.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };

        let alice_home = dir.path().join("alice");
        let bob_home = dir.path().join("bob");
        std::fs::create_dir(&alice_home).unwrap();
        std::fs::create_dir(&bob_home).unwrap();

        let (tool, broken_tool, recording_tool) = stub_tools().clone();

        let fixture = Self {
            caller: Caller::new(uid, gid),
            alice: Identity::new(uid, gid, alice_home, "alice"),
            bob: Identity::new(uid, gid, bob_home, "bob"),
            tool,
            broken_tool,
            recording_tool,
            dir,
        };
        fixture.write_list(&fixture.alice, "export", "bob\n");
        fixture
    }

    pub fn resolver(&self) -> MapResolver {
        self.resolver_with(&[&self.alice, &self.bob])
    }

    /// Resolver where `by_uid` returns the first identity for that uid.
    pub fn resolver_with(&self, identities: &[&Identity]) -> MapResolver {
        let mut by_uid = HashMap::new();
        for id in identities {
            by_uid.entry(id.uid).or_insert_with(|| (*id).clone());
        }
        MapResolver {
            by_name: identities
                .iter()
                .map(|id| (id.username.clone(), (*id).clone()))
                .collect(),
            by_uid,
        }
    }

    /// Configuration using the stub tool. The test uid is exempt from the
    /// system account rule.
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            xauth_path: self.tool.clone(),
            target_user: self.caller.uid,
            ..SessionConfig::default()
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            format!("xauthpath={}", self.tool.display()),
            format!("targetuser={}", self.caller.uid),
        ]
    }

    pub fn write_list(&self, owner: &Identity, direction: &str, contents: &str) {
        let dir = owner.home.join(".xauth");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(direction), contents).unwrap();
    }

    pub fn remove_list(&self, owner: &Identity, direction: &str) {
        std::fs::remove_file(owner.home.join(".xauth").join(direction)).unwrap();
    }

    /// Write alice's default `.Xauthority`.
    pub fn write_cookies(&self, contents: &str) -> PathBuf {
        let path = self.alice.home.join(".Xauthority");
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Forwarded authority files currently in bob's home.
    pub fn forwarded_files(&self) -> Vec<PathBuf> {
        forwarded_files_in(&self.bob.home)
    }

    /// Add an account with its own uid/gid and a private home owned by it.
    /// Only root can set this up; the fixture directory is opened up so the
    /// account can reach its home.
    pub fn add_private_account(&self, name: &str, uid: u32, gid: u32) -> Identity {
        let home = self.dir.path().join(name);
        std::fs::create_dir(&home).unwrap();
        std::os::unix::fs::chown(&home, Some(uid), Some(gid)).unwrap();
        std::fs::set_permissions(&home, std::fs::Permissions::from_mode(0o700)).unwrap();
        std::fs::set_permissions(self.dir.path(), std::fs::Permissions::from_mode(0o711))
            .unwrap();
        Identity::new(uid, gid, home, name)
    }
}

/// Forwarded authority files (`.xauthXXXXXX`) currently in `home`.
pub fn forwarded_files_in(home: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(home)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(".xauth") && n.len() == 12)
            })
            .collect()
}

/// Stub tools are written once per test binary, before any test spawns a
/// child, so no child can hold a script open for writing when it is
/// executed (ETXTBSY). They live in the system temp directory so that
/// accounts other than the test user can run them.
fn stub_tools() -> &'static (PathBuf, PathBuf, PathBuf) {
    static TOOLS: OnceLock<(PathBuf, PathBuf, PathBuf)> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("xauthfwd-stub-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();
        (
            write_script(&dir, "xauth", STUB_XAUTH),
            write_script(&dir, "xauth-broken", BROKEN_MERGE_XAUTH),
            write_script(&dir, "xauth-recording", RECORDING_XAUTH),
        )
    })
}

fn write_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
