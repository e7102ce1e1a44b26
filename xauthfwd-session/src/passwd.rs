//! User identity lookup.

use std::ffi::{CStr, CString, OsStr};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use xauthfwd_core::Identity;

/// Upper bound for the getpw*_r scratch buffer.
const MAX_BUFFER: usize = 1 << 20;

/// Errors from identity lookup.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No account with that name or uid.
    #[error("no such user: {0}")]
    NotFound(String),

    /// The user database could not be queried.
    #[error("user lookup for {user} failed: {source}")]
    Lookup {
        user: String,
        #[source]
        source: io::Error,
    },

    /// The name cannot be passed to the user database.
    #[error("invalid user name: {0:?}")]
    InvalidName(String),
}

/// Maps user names and uids to resolved identities.
pub trait IdentityResolver {
    fn by_name(&self, name: &str) -> Result<Identity, ResolveError>;
    fn by_uid(&self, uid: u32) -> Result<Identity, ResolveError>;
}

impl<R: IdentityResolver + ?Sized> IdentityResolver for &R {
    fn by_name(&self, name: &str) -> Result<Identity, ResolveError> {
        (**self).by_name(name)
    }

    fn by_uid(&self, uid: u32) -> Result<Identity, ResolveError> {
        (**self).by_uid(uid)
    }
}

/// Resolver backed by the system user database (getpwnam_r/getpwuid_r).
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswdResolver;

impl IdentityResolver for PasswdResolver {
    fn by_name(&self, name: &str) -> Result<Identity, ResolveError> {
        let c_name = CString::new(name).map_err(|_| ResolveError::InvalidName(name.to_string()))?;
        getpw(name, |pwd, buf, len, result| unsafe {
            libc::getpwnam_r(c_name.as_ptr(), pwd, buf, len, result)
        })
    }

    fn by_uid(&self, uid: u32) -> Result<Identity, ResolveError> {
        getpw(&format!("uid {uid}"), |pwd, buf, len, result| unsafe {
            libc::getpwuid_r(uid, pwd, buf, len, result)
        })
    }
}

/// Run a reentrant passwd query, growing the buffer on ERANGE.
fn getpw<F>(user: &str, mut query: F) -> Result<Identity, ResolveError>
where
    F: FnMut(*mut libc::passwd, *mut libc::c_char, libc::size_t, *mut *mut libc::passwd) -> libc::c_int,
{
    let mut len = match unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) } {
        n if n > 0 => n as usize,
        _ => 1024,
    };

    loop {
        let mut buf: Vec<libc::c_char> = vec![0; len];
        // SAFETY: passwd is plain data; getpw*_r fills it in on success.
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        let rc = query(
            &mut pwd as *mut libc::passwd,
            buf.as_mut_ptr(),
            buf.len(),
            &mut result as *mut *mut libc::passwd,
        );

        if rc == libc::ERANGE && len < MAX_BUFFER {
            len *= 2;
            continue;
        }
        if result.is_null() {
            return match rc {
                0 | libc::ENOENT | libc::ESRCH | libc::EBADF | libc::EPERM => {
                    Err(ResolveError::NotFound(user.to_string()))
                }
                errno => Err(ResolveError::Lookup {
                    user: user.to_string(),
                    source: io::Error::from_raw_os_error(errno),
                }),
            };
        }

        // SAFETY: on success the string fields point into `buf`, which is
        // still alive here.
        let (name, dir) = unsafe { (CStr::from_ptr(pwd.pw_name), CStr::from_ptr(pwd.pw_dir)) };
        return Ok(Identity::new(
            pwd.pw_uid,
            pwd.pw_gid,
            PathBuf::from(OsStr::from_bytes(dir.to_bytes())),
            name.to_string_lossy().into_owned(),
        ));
    }
}
