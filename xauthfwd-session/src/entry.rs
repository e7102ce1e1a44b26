//! Session entry points called by the host stack.

use xauthfwd_core::{Caller, ConfigWarning, SessionConfig, SessionResult};

use crate::env::SessionEnv;
use crate::forward::Forwarder;
use crate::passwd::IdentityResolver;
use crate::store::SessionStore;
use crate::teardown::teardown;

/// Parse module options, logging every ignored option.
pub fn load_config<S: AsRef<str>>(args: &[S]) -> SessionConfig {
    let (config, warnings) = SessionConfig::from_args(args);
    for warning in warnings {
        tracing::warn!("{warning}");
    }
    config
}

/// Session open: forward the caller's cookie to `target_user`.
///
/// Returns [`SessionResult::Success`] when there is no display or the
/// cookie was forwarded, and [`SessionResult::SessionError`] otherwise.
pub fn open_session<S, R>(
    args: &[S],
    target_user: &str,
    caller: Caller,
    env: &mut SessionEnv,
    store: &mut SessionStore,
    resolver: &R,
) -> SessionResult
where
    S: AsRef<str>,
    R: IdentityResolver + ?Sized,
{
    let config = load_config(args);
    let debug = config.debug;

    match Forwarder::new(config, resolver).open(caller, target_user, env, store) {
        Ok(_) => SessionResult::Success,
        Err(e) => {
            if !e.is_refusal() {
                tracing::error!("{e}");
            } else if debug {
                tracing::debug!("{e}");
            }
            SessionResult::from(&e)
        }
    }
}

/// Session close: remove the file created at open. Always succeeds.
pub fn close_session<S: AsRef<str>>(args: &[S], store: &mut SessionStore) -> SessionResult {
    let (config, warnings) = close_config(args);
    for warning in warnings {
        tracing::warn!("{warning}");
    }
    teardown(store, config.debug);
    SessionResult::Success
}

/// Close only uses `debug`; malformed numeric options are not reported
/// again, unknown options are.
fn close_config<S: AsRef<str>>(args: &[S]) -> (SessionConfig, Vec<ConfigWarning>) {
    let (config, mut warnings) = SessionConfig::from_args(args);
    warnings.retain(ConfigWarning::is_unrecognized);
    (config, warnings)
}
