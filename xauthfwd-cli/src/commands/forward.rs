//! Forwarding session from the command line.

use std::path::PathBuf;

use anyhow::{bail, Result};
use xauthfwd_core::{SessionResult, COOKIE_FILE_KEY, DISPLAY_ENV};
use xauthfwd_session::{
    close_session, current_caller, open_session, PasswdResolver, SessionEnv, SessionStore,
};

/// Run session open for `user` against this process's environment,
/// print what was published, then run session close unless `keep`.
pub fn forward(user: &str, options: &[String], keep: bool, json: bool) -> Result<()> {
    let mut env = SessionEnv::from_process();
    let mut store = SessionStore::new();

    tracing::debug!(user, keep, "opening forwarding session");
    let result = open_session(
        options,
        user,
        current_caller(),
        &mut env,
        &mut store,
        &PasswdResolver,
    );
    if result != SessionResult::Success {
        bail!("forwarding X authority to {user} failed");
    }

    let Some(authority_file) = store.get(COOKIE_FILE_KEY).map(PathBuf::from) else {
        if json {
            println!("{}", serde_json::json!({ "outcome": "no_display" }));
        } else {
            println!("DISPLAY is not set, nothing to forward");
        }
        return Ok(());
    };
    let display = env
        .get(DISPLAY_ENV)
        .map(|d| d.to_string_lossy().into_owned())
        .unwrap_or_default();
    let merged = std::fs::metadata(&authority_file).is_ok_and(|meta| meta.len() > 0);

    let removed = if keep {
        false
    } else {
        tracing::debug!(path = %authority_file.display(), "closing forwarding session");
        close_session(options, &mut store);
        !authority_file.exists()
    };

    if json {
        let out = serde_json::json!({
            "outcome": "forwarded",
            "xauthority": authority_file.display().to_string(),
            "display": display,
            "merged": merged,
            "removed": removed,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("XAUTHORITY={}", authority_file.display());
        println!("DISPLAY={display}");
        if !merged {
            println!("warning: cookie was not merged into {}", authority_file.display());
        }
        if removed {
            println!("removed {}", authority_file.display());
        }
    }
    Ok(())
}
