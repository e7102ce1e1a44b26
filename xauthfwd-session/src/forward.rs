//! Cookie transfer orchestration.
//!
//! Session open walks through these steps, aborting at the first failure:
//!
//! 1. Nothing to do without `DISPLAY`
//! 2. Resolve the invoker (from the caller's real uid) and the target
//! 3. Refuse system accounts
//! 4. Check the invoker's export list and the target's import list
//! 5. List the invoker's cookie for the display, as the invoker
//! 6. Create an empty authority file owned by the target
//! 7. Record its path in session storage for teardown
//! 8. Publish `XAUTHORITY` and `DISPLAY` in the session environment
//! 9. Merge the cookie into the new file, as the target
//!
//! From step 7 on the session is committed to the new file: a failed merge
//! is logged and reported as [`OpenOutcome::Forwarded`] with
//! `merged: false`, leaving teardown to remove the file.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use xauthfwd_core::{
    export_default, import_default, local_display_fallback, Caller, Direction, Identity,
    SessionConfig, COOKIE_FILE_KEY, DEFAULT_AUTHORITY_FILE, DISPLAY_ENV, XAUTHORITY_ENV,
};
use xauthfwd_privsep::{run, RunError, SpawnSpec};

use crate::acl::AclEvaluator;
use crate::authfile::{create_authority_file, local_hostname};
use crate::env::SessionEnv;
use crate::error::ForwardError;
use crate::passwd::IdentityResolver;
use crate::store::SessionStore;

/// What a successful session open did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// `DISPLAY` was not set; nothing was forwarded.
    NoDisplay,
    /// A new authority file was created and published.
    Forwarded {
        /// Path of the new file, now in `XAUTHORITY`.
        authority_file: PathBuf,
        /// Display the cookie belongs to, now in `DISPLAY`.
        display: OsString,
        /// False when the cookie could not be merged into the file.
        merged: bool,
    },
}

/// Runs the forwarding workflow for one session.
pub struct Forwarder<'a, R: ?Sized> {
    config: SessionConfig,
    resolver: &'a R,
    hostname: Option<String>,
}

impl<'a, R: IdentityResolver + ?Sized> Forwarder<'a, R> {
    pub fn new(config: SessionConfig, resolver: &'a R) -> Self {
        Self {
            config,
            resolver,
            hostname: None,
        }
    }

    /// Use `hostname` instead of the system's host name for local display
    /// fallback.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Forward the caller's cookie to `target_user`.
    pub fn open(
        &self,
        caller: Caller,
        target_user: &str,
        env: &mut SessionEnv,
        store: &mut SessionStore,
    ) -> Result<OpenOutcome, ForwardError> {
        let debug = self.config.debug;

        let Some(display) = env.get(DISPLAY_ENV).map(OsStr::to_os_string) else {
            if debug {
                tracing::debug!("user has no DISPLAY, doing nothing");
            }
            return Ok(OpenOutcome::NoDisplay);
        };

        let invoker = self
            .resolver
            .by_uid(caller.uid)
            .map_err(|source| ForwardError::Invoker {
                uid: caller.uid,
                source,
            })?;
        let target = self
            .resolver
            .by_name(target_user)
            .map_err(|source| ForwardError::Target {
                user: target_user.to_string(),
                source,
            })?;

        if debug {
            tracing::debug!(
                requesting_uid = invoker.uid,
                requesting_gid = invoker.gid,
                target_uid = target.uid,
                target_gid = target.gid,
                "resolved users"
            );
        }

        if self.config.is_system_account(target.uid) {
            return Err(ForwardError::SystemAccount { uid: target.uid });
        }

        self.check_acls(&caller, &invoker, &target)?;

        let source_file = env
            .get(XAUTHORITY_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| invoker.home.join(DEFAULT_AUTHORITY_FILE));
        if debug {
            tracing::debug!(path = %source_file.display(), "reading keys");
        }

        let cookie = self.read_cookie(&caller, &source_file, &display)?;

        let authority_file = create_authority_file(&target)?;

        let path = authority_file.clone();
        let release = move |value: OsString| {
            tracing::trace!(path = ?value, "released stored authority file name");
        };
        if let Err(source) = store.set_with_cleanup(COOKIE_FILE_KEY, path.clone(), release) {
            tracing::error!(path = %path.display(), error = %source, "error saving name of temporary file");
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "cannot remove temporary file");
            }
            return Err(ForwardError::Store { path, source });
        }

        env.unset(XAUTHORITY_ENV);
        env.set(XAUTHORITY_ENV, authority_file.clone());
        env.set(DISPLAY_ENV, display.clone());

        let merged = self.merge_cookie(&target, &authority_file, cookie);

        Ok(OpenOutcome::Forwarded {
            authority_file,
            display,
            merged,
        })
    }

    /// Both the export and the import check must permit the transfer.
    fn check_acls(
        &self,
        caller: &Caller,
        invoker: &Identity,
        target: &Identity,
    ) -> Result<(), ForwardError> {
        let acl = AclEvaluator::new(self.resolver, self.config.debug);

        let checks = [
            (Direction::Export, invoker, target, export_default(caller)),
            (Direction::Import, target, invoker, import_default()),
        ];
        for (direction, subject, object, default) in checks {
            let decision = acl
                .decide(direction, &subject.username, &object.username, default)
                .map_err(ForwardError::AclOwner)?;
            if !decision.is_permitted() {
                return Err(ForwardError::Denied {
                    direction,
                    subject: subject.username.clone(),
                    object: object.username.clone(),
                });
            }
        }
        Ok(())
    }

    /// List the cookie for `requested`, retrying once with the host-name form
    /// of a local display.
    fn read_cookie(
        &self,
        caller: &Caller,
        source_file: &Path,
        requested: &OsStr,
    ) -> Result<Vec<u8>, ForwardError> {
        let cookie = self.list_cookie(caller, source_file, requested)?;
        if !cookie.is_empty() {
            return Ok(cookie);
        }

        if let Some(alternate) = self.fallback_display(requested) {
            if self.config.debug {
                tracing::debug!(
                    display = ?requested,
                    alternate = %alternate,
                    "no key for display, trying alternate"
                );
            }
            let cookie = self.list_cookie(caller, source_file, OsStr::new(&alternate))?;
            if !cookie.is_empty() {
                return Ok(cookie);
            }
        }

        if self.config.debug {
            tracing::debug!("no key");
        }
        Err(ForwardError::NoCookie {
            display: requested.to_string_lossy().into_owned(),
        })
    }

    fn fallback_display(&self, display: &OsStr) -> Option<String> {
        let display = display.to_str()?;
        let hostname = match &self.hostname {
            Some(hostname) => hostname.clone(),
            None => match local_hostname() {
                Ok(hostname) => hostname,
                Err(e) => {
                    if self.config.debug {
                        tracing::debug!(error = %e, "cannot determine host name");
                    }
                    return None;
                }
            },
        };
        local_display_fallback(display, &hostname)
    }

    /// `<xauth> -f <file> nlist <display>` as the caller.
    fn list_cookie(
        &self,
        caller: &Caller,
        source_file: &Path,
        display: &OsStr,
    ) -> Result<Vec<u8>, RunError> {
        let spec = SpawnSpec::new(&self.config.xauth_path, caller.uid, caller.gid)
            .arg("-f")
            .arg(source_file)
            .arg("nlist")
            .arg(display);
        self.log_invocation(&spec);
        run(spec).map(|output| output.stdout)
    }

    /// `<xauth> -f <file> nmerge -` as the target, cookie on stdin.
    ///
    /// Returns false when the tool could not be run or left the file empty.
    fn merge_cookie(&self, target: &Identity, authority_file: &Path, cookie: Vec<u8>) -> bool {
        let spec = SpawnSpec::new(&self.config.xauth_path, target.uid, target.gid)
            .arg("-f")
            .arg(authority_file)
            .args(["nmerge", "-"])
            .input(cookie);
        if self.config.debug {
            tracing::debug!(path = %authority_file.display(), "writing key to temporary file");
        }
        self.log_invocation(&spec);

        if let Err(e) = run(spec) {
            tracing::error!(path = %authority_file.display(), error = %e, "error merging key");
            return false;
        }

        match std::fs::metadata(authority_file) {
            Ok(meta) if meta.len() > 0 => true,
            Ok(_) => {
                tracing::warn!(path = %authority_file.display(), "temporary file is empty after merge");
                false
            }
            Err(e) => {
                tracing::warn!(path = %authority_file.display(), error = %e, "cannot inspect temporary file");
                false
            }
        }
    }

    fn log_invocation(&self, spec: &SpawnSpec) {
        if self.config.debug {
            tracing::debug!(
                program = %spec.program.display(),
                args = ?spec.args,
                uid = spec.uid,
                gid = spec.gid,
                "running authority tool"
            );
        }
    }
}
