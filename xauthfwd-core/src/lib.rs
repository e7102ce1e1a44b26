//! # xauthfwd core
//!
//! Domain types and pure policy for forwarding an X authority cookie from
//! the invoking user to a target user across a privilege transition.
//!
//! ## Design Principles
//!
//! This crate is intentionally **IO-free**:
//! - No filesystem operations
//! - No process spawning
//! - No identity lookups
//! - No OS-specific APIs
//!
//! The actual IO (passwd lookups, scoped filesystem identity, running the
//! authority tool) lives in `xauthfwd-session` and `xauthfwd-privsep`.
//!
//! ## Modules
//!
//! - [`identity`] - Resolved user identities and the invoking caller
//! - [`acl`] - Allow-list directions and decisions
//! - [`config`] - Module option parsing
//! - [`display`] - Display name handling

pub mod acl;
pub mod config;
pub mod display;
pub mod identity;

pub use acl::{export_default, import_default, AclDecision, Direction};
pub use config::{ConfigWarning, SessionConfig, DEFAULT_SYSTEM_USER_CEILING, DEFAULT_XAUTH_PATH};
pub use display::local_display_fallback;
pub use identity::{Caller, Identity};

/// Environment variable carrying the path of the X authority file.
pub const XAUTHORITY_ENV: &str = "XAUTHORITY";

/// Environment variable carrying the X display name.
pub const DISPLAY_ENV: &str = "DISPLAY";

/// Authority file name used when `XAUTHORITY` is not set.
pub const DEFAULT_AUTHORITY_FILE: &str = ".Xauthority";

/// Session storage key under which the forwarded file path is recorded.
pub const COOKIE_FILE_KEY: &str = "pam_xauth_cookie_file";

/// Per-user directory holding the `export` and `import` allow-lists.
pub const ACL_DIR: &str = ".xauth";

/// Name prefix of forwarded authority files in the target's home.
pub const TEMP_PREFIX: &str = ".xauth";

/// Number of random characters appended to [`TEMP_PREFIX`].
pub const TEMP_SUFFIX_LEN: usize = 6;

/// Outcome reported to the host authentication stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionResult {
    Success,
    SessionError,
}

impl SessionResult {
    /// Returns true for [`SessionResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
