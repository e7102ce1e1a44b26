//! Allow-list evaluation.
//!
//! A subject's list for a direction lives at `~/.xauth/<direction>` and
//! holds one shell-style glob per line. The file is opened with the
//! subject's own filesystem identity, so a privileged caller cannot be
//! tricked into reading a file the subject could not read.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use xauthfwd_core::{AclDecision, Direction, Identity, ACL_DIR};
use xauthfwd_privsep::with_fs_identity;

use crate::passwd::{IdentityResolver, ResolveError};

/// Scan allow-list lines for a pattern matching `object`.
///
/// Returns [`AclDecision::Permit`] at the first matching line and
/// [`AclDecision::Deny`] when no line matches. Each line is cut at its
/// first carriage return or newline. Lines that are not valid UTF-8 or
/// not valid patterns never match.
pub fn scan_allow_list<R: BufRead>(reader: R, object: &str) -> io::Result<AclDecision> {
    for line in reader.split(b'\n') {
        let mut line = line?;
        if let Some(end) = line.iter().position(|&b| b == b'\r' || b == b'\n') {
            line.truncate(end);
        }
        let Ok(pattern) = std::str::from_utf8(&line) else {
            continue;
        };
        if let Ok(pattern) = glob::Pattern::new(pattern) {
            if pattern.matches(object) {
                return Ok(AclDecision::Permit);
            }
        }
    }
    Ok(AclDecision::Deny)
}

/// Decides whether forwarding between two users is allowed.
pub struct AclEvaluator<'a, R: ?Sized> {
    resolver: &'a R,
    debug: bool,
}

impl<'a, R: IdentityResolver + ?Sized> AclEvaluator<'a, R> {
    pub fn new(resolver: &'a R, debug: bool) -> Self {
        Self { resolver, debug }
    }

    /// Consult `subject`'s allow-list for `direction` about `object`.
    ///
    /// A missing list yields `default`. A list that exists but cannot be
    /// opened or read yields [`AclDecision::Deny`].
    pub fn decide(
        &self,
        direction: Direction,
        subject: &str,
        object: &str,
        default: AclDecision,
    ) -> Result<AclDecision, ResolveError> {
        let owner = self.resolver.by_name(subject).inspect_err(|e| {
            tracing::error!(user = subject, error = %e, "error determining home directory");
        })?;
        Ok(self.decide_for(direction, &owner, object, default))
    }

    /// Like [`decide`](Self::decide) for an already resolved subject.
    pub fn decide_for(
        &self,
        direction: Direction,
        subject: &Identity,
        object: &str,
        default: AclDecision,
    ) -> AclDecision {
        let decision = self.consult(direction, subject, object);
        if decision == AclDecision::NotConfigured && self.debug {
            let action = if default.is_permitted() { "ignoring" } else { "failing" };
            tracing::debug!(
                path = %allow_list_path(subject, direction).display(),
                "allow-list does not exist, {action}"
            );
        }
        decision.resolve(default)
    }

    /// Read `subject`'s list without applying a default.
    ///
    /// Returns [`AclDecision::NotConfigured`] when the list does not exist.
    pub fn consult(&self, direction: Direction, subject: &Identity, object: &str) -> AclDecision {
        let path = allow_list_path(subject, direction);

        let opened = match with_fs_identity(subject.uid, subject.gid, || File::open(&path)) {
            Ok(opened) => opened,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot check allow-list");
                return AclDecision::Deny;
            }
        };

        let file = match opened {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return AclDecision::NotConfigured,
            Err(e) => {
                if self.debug {
                    tracing::error!(path = %path.display(), error = %e, "error opening allow-list");
                }
                return AclDecision::Deny;
            }
        };

        let decision = match scan_allow_list(BufReader::new(file), object) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "error reading allow-list");
                AclDecision::Deny
            }
        };

        if self.debug {
            match decision {
                AclDecision::Permit => tracing::debug!(
                    path = %path.display(),
                    "{object} {direction} allowed"
                ),
                _ => tracing::debug!(path = %path.display(), "{object} not listed"),
            }
        }
        decision
    }
}

/// `<home>/.xauth/<direction>`
pub fn allow_list_path(subject: &Identity, direction: Direction) -> PathBuf {
    subject.home.join(ACL_DIR).join(direction.as_str())
}
