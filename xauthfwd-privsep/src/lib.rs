//! Privilege primitives for xauthfwd.
//!
//! This crate wraps the two ways the forwarding workflow acts as another
//! user:
//!
//! - [`run`] executes a tool in a child process that has dropped to a given
//!   uid/gid, feeding it input on stdin and capturing stdout. The child
//!   inherits stdin and stdout only.
//! - [`FsIdentityGuard`] temporarily assumes another user's filesystem
//!   identity inside the current process for a single file operation.
//!
//! # Example
//!
//! ```no_run
//! use xauthfwd_privsep::{run, SpawnSpec};
//!
//! let spec = SpawnSpec::new("/usr/bin/xauth", 1000, 1000)
//!     .args(["-f", "/home/alice/.Xauthority", "nlist", ":0"]);
//!
//! let output = run(spec).unwrap();
//! println!("{} bytes of cookie", output.stdout.len());
//! ```

mod error;
mod fsid;
mod platform;
mod spawn;
mod wait;

// Re-export public API
pub use error::{IdentityError, RunError};
pub use fsid::{with_fs_identity, FsIdentityGuard};
pub use spawn::{run, RunOutput, SpawnSpec};
pub use wait::ExitStatus;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::os::fd::AsRawFd;

    fn current_ids() -> (u32, u32) {
        unsafe { (libc::getuid(), libc::getgid()) }
    }

    fn spec(program: &str) -> SpawnSpec {
        let (uid, gid) = current_ids();
        SpawnSpec::new(program, uid, gid)
    }

    #[test]
    fn test_exit_status_code() {
        let status = ExitStatus::Code(0);
        assert!(status.success());
        assert_eq!(status.code(), Some(0));
        assert_eq!(status.signal(), None);

        let status = ExitStatus::Code(1);
        assert!(!status.success());
        assert_eq!(status.code(), Some(1));
    }

    #[test]
    fn test_exit_status_signaled() {
        let status = ExitStatus::Signaled(libc::SIGTERM);
        assert!(!status.success());
        assert_eq!(status.code(), None);
        assert_eq!(status.signal(), Some(libc::SIGTERM));
    }

    #[test]
    fn test_run_echo() {
        let output = run(spec("/bin/echo").arg("hello")).unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"hello\n");
    }

    #[test]
    fn test_run_feeds_input() {
        let output = run(spec("/bin/cat").input(b"cookie line\n".to_vec())).unwrap();
        assert_eq!(output.stdout, b"cookie line\n");
    }

    #[test]
    fn test_run_without_input_sees_eof() {
        // cat exits once stdin is closed
        let output = run(spec("/bin/cat")).unwrap();
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_run_large_output() {
        let output = run(spec("/bin/sh").args(["-c", "head -c 200000 /dev/zero"])).unwrap();
        assert_eq!(output.stdout.len(), 200_000);
    }

    #[test]
    fn test_failing_status_is_reported_not_raised() {
        let output = run(spec("/bin/sh").args(["-c", "echo partial; exit 3"])).unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout, b"partial\n");
    }

    #[test]
    fn test_stderr_is_discarded() {
        let output = run(spec("/bin/sh").args(["-c", "echo oops >&2"])).unwrap();
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_child_input_ignored() {
        // The child exits without reading; the write error is swallowed.
        let output = run(spec("/bin/true").input(vec![b'x'; 1 << 20])).unwrap();
        assert!(output.status.success());
    }

    #[test]
    fn test_runs_as_requested_ids() {
        let (uid, gid) = current_ids();
        let output = run(spec("/usr/bin/id").arg("-u")).unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), uid.to_string());
        let output = run(spec("/usr/bin/id").arg("-g")).unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), gid.to_string());
    }

    #[test]
    fn test_spawn_nonexistent() {
        let result = run(spec("/nonexistent/path/to/program"));
        assert!(matches!(result, Err(RunError::Spawn(_))));
    }

    #[test]
    fn test_nul_in_argument_rejected() {
        let result = run(spec("/bin/echo").arg("a\0b"));
        assert!(matches!(result, Err(RunError::InvalidArgument(_))));
        let result = run(spec(""));
        assert!(matches!(result, Err(RunError::InvalidArgument(_))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_parent_descriptors_not_inherited() {
        let file = tempfile::tempfile().unwrap();
        let fd = unsafe { libc::dup(file.as_raw_fd()) };
        assert!(fd > 2);

        let script = format!("if [ -e /proc/self/fd/{fd} ]; then echo open; else echo closed; fi");
        let output = run(spec("/bin/sh").args(["-c", script.as_str()])).unwrap();
        unsafe { libc::close(fd) };

        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "closed");
    }

    #[test]
    fn test_fs_identity_roundtrip() {
        let (uid, gid) = current_ids();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owned");

        let created = with_fs_identity(uid, gid, || File::create(&path)).unwrap();
        assert!(created.is_ok());

        use std::os::unix::fs::MetadataExt;
        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.uid(), unsafe { libc::geteuid() });
    }

    #[test]
    fn test_fs_identity_guard_restores_on_drop() {
        let (uid, gid) = current_ids();
        {
            let _guard = FsIdentityGuard::assume(uid, gid).unwrap();
        }
        // A second assumption after restore still succeeds.
        let _guard = FsIdentityGuard::assume(uid, gid).unwrap();
    }
}
