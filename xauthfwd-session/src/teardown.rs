//! Session teardown.

use std::path::PathBuf;

use xauthfwd_core::COOKIE_FILE_KEY;

use crate::store::SessionStore;

/// Remove the authority file recorded at session open.
///
/// The stored path is replaced with an empty marker before returning, so
/// only the first call in a session attempts a removal. Removal failures
/// are logged and otherwise ignored. Returns the path removal was
/// attempted on.
pub fn teardown(store: &mut SessionStore, debug: bool) -> Option<PathBuf> {
    let stored = store.get_mut(COOKIE_FILE_KEY)?;
    if stored.is_empty() {
        return None;
    }
    let path = PathBuf::from(std::mem::take(stored));

    if debug {
        tracing::debug!(path = %path.display(), "removing forwarded authority file");
    }
    if let Err(e) = std::fs::remove_file(&path) {
        tracing::warn!(path = %path.display(), error = %e, "cannot remove forwarded authority file");
    }
    Some(path)
}
