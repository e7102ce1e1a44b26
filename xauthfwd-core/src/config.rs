//! Module option parsing.
//!
//! Options arrive from the host stack as a flat list of `key=value` pairs
//! and bare flags. Problems never fail the session: each one becomes a
//! [`ConfigWarning`] and the affected setting keeps its default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Authority tool used when `xauthpath=` is not given.
pub const DEFAULT_XAUTH_PATH: &str = "/usr/X11R6/bin/xauth";

/// Highest uid treated as a system account when `systemuser=` is not given.
pub const DEFAULT_SYSTEM_USER_CEILING: u32 = 499;

/// Settings for one session-open or session-close call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Emit verbose diagnostics.
    pub debug: bool,
    /// Authority database tool to execute.
    pub xauth_path: PathBuf,
    /// Non-root uids at or below this value never receive a cookie.
    pub system_user_ceiling: u32,
    /// Uid exempted from the system account rule.
    pub target_user: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debug: false,
            xauth_path: PathBuf::from(DEFAULT_XAUTH_PATH),
            system_user_ceiling: DEFAULT_SYSTEM_USER_CEILING,
            target_user: 0,
        }
    }
}

/// A module option that was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A numeric option whose value is not a decimal uid.
    InvalidValue { option: &'static str, value: String },
    /// An option this module does not know.
    Unrecognized(String),
}

impl ConfigWarning {
    /// Returns true for options this module does not know at all.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { option, value } => {
                write!(f, "invalid value for {option} (`{value}')")
            }
            Self::Unrecognized(arg) => write!(f, "unrecognized option `{arg}'"),
        }
    }
}

impl SessionConfig {
    /// Parse module options.
    ///
    /// Returns the resulting configuration together with every option that
    /// was ignored, in argument order.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> (Self, Vec<ConfigWarning>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        for arg in args {
            let arg = arg.as_ref();
            if arg == "debug" {
                config.debug = true;
            } else if let Some(path) = arg.strip_prefix("xauthpath=") {
                config.xauth_path = PathBuf::from(path);
            } else if let Some(value) = arg.strip_prefix("targetuser=") {
                match parse_uid(value) {
                    Some(uid) => config.target_user = uid,
                    None => warnings.push(ConfigWarning::InvalidValue {
                        option: "targetuser",
                        value: value.to_string(),
                    }),
                }
            } else if let Some(value) = arg.strip_prefix("systemuser=") {
                match parse_uid(value) {
                    Some(uid) => config.system_user_ceiling = uid,
                    None => warnings.push(ConfigWarning::InvalidValue {
                        option: "systemuser",
                        value: value.to_string(),
                    }),
                }
            } else {
                warnings.push(ConfigWarning::Unrecognized(arg.to_string()));
            }
        }

        (config, warnings)
    }

    /// Returns true if `uid` is a system account that must not receive a
    /// forwarded cookie.
    pub fn is_system_account(&self, uid: u32) -> bool {
        uid != 0 && uid != self.target_user && uid <= self.system_user_ceiling
    }
}

/// Whole-string decimal uid. Signs and surrounding whitespace are rejected.
fn parse_uid(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let (config, warnings) = SessionConfig::from_args::<&str>(&[]);
        assert!(warnings.is_empty());
        assert!(!config.debug);
        assert_eq!(config.xauth_path, PathBuf::from("/usr/X11R6/bin/xauth"));
        assert_eq!(config.system_user_ceiling, 499);
        assert_eq!(config.target_user, 0);
    }

    #[test]
    fn all_options() {
        let (config, warnings) = SessionConfig::from_args(&[
            "debug",
            "xauthpath=/usr/bin/xauth",
            "targetuser=42",
            "systemuser=999",
        ]);
        assert!(warnings.is_empty());
        assert!(config.debug);
        assert_eq!(config.xauth_path, PathBuf::from("/usr/bin/xauth"));
        assert_eq!(config.target_user, 42);
        assert_eq!(config.system_user_ceiling, 999);
    }

    #[test]
    fn malformed_numbers_keep_defaults() {
        let (config, warnings) =
            SessionConfig::from_args(&["systemuser=12abc", "targetuser=", "systemuser=-5"]);
        assert_eq!(config.system_user_ceiling, 499);
        assert_eq!(config.target_user, 0);
        assert_eq!(warnings.len(), 3);
        assert_eq!(
            warnings[0],
            ConfigWarning::InvalidValue {
                option: "systemuser",
                value: "12abc".to_string()
            }
        );
        assert_eq!(
            warnings[1].to_string(),
            "invalid value for targetuser (`')"
        );
    }

    #[test]
    fn unknown_options_are_reported() {
        let (config, warnings) = SessionConfig::from_args(&["verbose", "debug"]);
        assert!(config.debug);
        assert_eq!(warnings, vec![ConfigWarning::Unrecognized("verbose".into())]);
        assert_eq!(warnings[0].to_string(), "unrecognized option `verbose'");
        assert!(warnings[0].is_unrecognized());
        assert!(!ConfigWarning::InvalidValue {
            option: "systemuser",
            value: "x".into()
        }
        .is_unrecognized());
    }

    #[test]
    fn later_options_win() {
        let (config, _) = SessionConfig::from_args(&["systemuser=100", "systemuser=200"]);
        assert_eq!(config.system_user_ceiling, 200);
    }

    #[test]
    fn system_account_rule() {
        let config = SessionConfig::default();
        assert!(!config.is_system_account(0));
        assert!(config.is_system_account(1));
        assert!(config.is_system_account(50));
        assert!(config.is_system_account(499));
        assert!(!config.is_system_account(500));

        let config = SessionConfig {
            target_user: 50,
            ..SessionConfig::default()
        };
        assert!(!config.is_system_account(50));
        assert!(config.is_system_account(51));
    }
}
