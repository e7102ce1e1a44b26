//! Creation of the forwarded authority file.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;
use xauthfwd_core::{Identity, TEMP_PREFIX, TEMP_SUFFIX_LEN};
use xauthfwd_privsep::with_fs_identity;

use crate::error::ForwardError;

/// Characters used for the random part of the file name (as mkstemp).
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Name collisions tolerated before giving up.
const MAX_ATTEMPTS: usize = 100;

/// Create an empty authority file owned by `target` in its home directory.
///
/// The file is created with `target`'s filesystem identity, then chowned
/// to `target` again. A failed chown is logged; the file is still used.
pub(crate) fn create_authority_file(target: &Identity) -> Result<PathBuf, ForwardError> {
    let (file, path) = with_fs_identity(target.uid, target.gid, || create_unique(&target.home))
        .map_err(|source| ForwardError::AssumeIdentity {
            user: target.username.clone(),
            source,
        })?
        .map_err(|source| {
            tracing::error!(
                dir = %target.home.display(),
                error = %source,
                "error creating temporary file"
            );
            ForwardError::CreateFile {
                dir: target.home.clone(),
                source,
            }
        })?;

    if let Err(e) = std::os::unix::fs::fchown(&file, Some(target.uid), Some(target.gid)) {
        tracing::error!(path = %path.display(), error = %e, "fchown failed");
    }

    Ok(path)
}

/// Open a new `<dir>/.xauthXXXXXX` file, mode 0600, failing if it exists.
fn create_unique(dir: &Path) -> io::Result<(File, PathBuf)> {
    for _ in 0..MAX_ATTEMPTS {
        let path = dir.join(random_name());
        match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&path)
        {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no unused temporary file name",
    ))
}

fn random_name() -> String {
    let mut random = [0u8; TEMP_SUFFIX_LEN];
    OsRng.fill_bytes(&mut random);

    let suffix: String = random
        .iter()
        .map(|&b| SUFFIX_CHARSET[b as usize % SUFFIX_CHARSET.len()] as char)
        .collect();

    format!("{TEMP_PREFIX}{suffix}")
}

/// Name of this machine, as used for local display entries.
pub(crate) fn local_hostname() -> io::Result<String> {
    let mut buf = [0u8; 256];
    if unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    fn current_user(home: &Path) -> Identity {
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        Identity::new(uid, gid, home, "bob")
    }

    #[test]
    fn random_names_have_the_expected_shape() {
        let name = random_name();
        assert_eq!(name.len(), TEMP_PREFIX.len() + TEMP_SUFFIX_LEN);
        assert!(name.starts_with(".xauth"));
        assert!(name[TEMP_PREFIX.len()..]
            .bytes()
            .all(|b| b.is_ascii_alphanumeric()));
        assert_ne!(random_name(), random_name());
    }

    #[test]
    fn creates_private_file_owned_by_target() {
        let home = tempfile::tempdir().unwrap();
        let bob = current_user(home.path());

        let path = create_authority_file(&bob).unwrap();
        assert_eq!(path.parent(), Some(home.path()));

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.len(), 0);
        assert_eq!(meta.uid(), bob.uid);
        assert_eq!(meta.gid(), bob.gid);
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn each_call_creates_a_new_file() {
        let home = tempfile::tempdir().unwrap();
        let bob = current_user(home.path());
        let first = create_authority_file(&bob).unwrap();
        let second = create_authority_file(&bob).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn missing_home_is_reported() {
        let home = tempfile::tempdir().unwrap();
        let bob = current_user(&home.path().join("gone"));
        let err = create_authority_file(&bob).unwrap_err();
        assert!(matches!(err, ForwardError::CreateFile { .. }));
    }

    #[test]
    fn hostname_is_not_empty() {
        assert!(!local_hostname().unwrap().is_empty());
    }
}
