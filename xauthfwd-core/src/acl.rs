//! Allow-list directions and decisions.
//!
//! Each user may keep two allow-lists under `~/.xauth/`:
//! - `export` lists users the owner is willing to hand a cookie to
//! - `import` lists users the owner is willing to accept a cookie from
//!
//! Forwarding requires the invoker's export list to permit the target and
//! the target's import list to permit the invoker.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::Caller;

/// Which allow-list is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Subject is the invoker, object is the target.
    Export,
    /// Subject is the target, object is the invoker.
    Import,
}

impl Direction {
    /// File name of the allow-list for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of consulting an allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclDecision {
    /// A pattern in the list matched.
    Permit,
    /// The list exists but nothing matched, or it could not be read.
    Deny,
    /// The list does not exist.
    NotConfigured,
}

impl AclDecision {
    /// Replace [`AclDecision::NotConfigured`] with `default`.
    pub fn resolve(self, default: AclDecision) -> AclDecision {
        match self {
            Self::NotConfigured => default,
            other => other,
        }
    }

    /// Returns true if this is a Permit decision.
    pub fn is_permitted(&self) -> bool {
        matches!(self, Self::Permit)
    }
}

impl fmt::Display for AclDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Permit => "permit",
            Self::Deny => "deny",
            Self::NotConfigured => "not configured",
        })
    }
}

/// Decision used when the invoker has no export list.
///
/// Root must opt in explicitly; everyone else exports by default.
pub fn export_default(caller: &Caller) -> AclDecision {
    if caller.is_root() {
        AclDecision::Deny
    } else {
        AclDecision::Permit
    }
}

/// Decision used when the target has no import list.
pub fn import_default() -> AclDecision {
    AclDecision::Permit
}
