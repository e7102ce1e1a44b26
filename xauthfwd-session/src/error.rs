//! Session engine error types.

use std::io;
use std::path::PathBuf;

use xauthfwd_core::{Direction, SessionResult};
use xauthfwd_privsep::{IdentityError, RunError};

use crate::passwd::ResolveError;
use crate::store::StoreError;

/// Reasons a session open does not forward a cookie.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The invoking user's account could not be resolved.
    #[error("error determining invoking user's name (uid {uid}): {source}")]
    Invoker {
        uid: u32,
        #[source]
        source: ResolveError,
    },

    /// The target user's account could not be resolved.
    #[error("error determining target user `{user}': {source}")]
    Target {
        user: String,
        #[source]
        source: ResolveError,
    },

    /// The owner of an allow-list could not be resolved.
    #[error("error determining home directory for allow-list: {0}")]
    AclOwner(#[source] ResolveError),

    /// The target is a system account.
    #[error("not forwarding cookies to user ID {uid}")]
    SystemAccount { uid: u32 },

    /// An allow-list refused the transfer.
    #[error("{subject}'s {direction} list does not permit `{object}'")]
    Denied {
        direction: Direction,
        subject: String,
        object: String,
    },

    /// No cookie is listed for the display.
    #[error("no key for display `{display}'")]
    NoCookie { display: String },

    /// The authority tool could not be run.
    #[error("running authority tool: {0}")]
    Run(#[from] RunError),

    /// The process could not act as the target user.
    #[error("cannot act as `{user}': {source}")]
    AssumeIdentity {
        user: String,
        #[source]
        source: IdentityError,
    },

    /// The forwarded authority file could not be created.
    #[error("error creating temporary file in {}: {source}", .dir.display())]
    CreateFile {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file path could not be recorded for teardown.
    #[error("error saving name of temporary file `{}': {source}", .path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

impl ForwardError {
    /// Policy refusals, as opposed to failures.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::SystemAccount { .. } | Self::Denied { .. } | Self::NoCookie { .. }
        )
    }
}

impl From<&ForwardError> for SessionResult {
    fn from(_: &ForwardError) -> Self {
        SessionResult::SessionError
    }
}
