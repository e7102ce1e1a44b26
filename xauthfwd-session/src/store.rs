//! Session-scoped keyed storage.
//!
//! Values live from session open to session close. Each value may carry a
//! cleanup closure that releases it; the closure runs exactly once, when
//! the value is replaced or when the session storage ends. Cleanup only
//! releases the stored value. Removing files is the job of
//! [`teardown`](crate::teardown).

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

/// Releases a stored value.
pub type Cleanup = Box<dyn FnOnce(OsString) + Send>;

/// Errors from session storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The session has already ended.
    #[error("session storage has ended")]
    Ended,
}

struct Entry {
    value: OsString,
    cleanup: Option<Cleanup>,
}

impl Entry {
    fn release(self) {
        if let Some(cleanup) = self.cleanup {
            cleanup(self.value);
        }
    }
}

/// Keyed storage for one session.
#[derive(Default)]
pub struct SessionStore {
    entries: HashMap<String, Entry>,
    ended: bool,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key` without a cleanup action.
    pub fn set(&mut self, key: &str, value: impl Into<OsString>) -> Result<(), StoreError> {
        self.insert(key, value.into(), None)
    }

    /// Store `value` under `key`; `cleanup` receives it when released.
    pub fn set_with_cleanup<F>(
        &mut self,
        key: &str,
        value: impl Into<OsString>,
        cleanup: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(OsString) + Send + 'static,
    {
        self.insert(key, value.into(), Some(Box::new(cleanup)))
    }

    fn insert(&mut self, key: &str, value: OsString, cleanup: Option<Cleanup>) -> Result<(), StoreError> {
        if self.ended {
            return Err(StoreError::Ended);
        }
        if let Some(previous) = self
            .entries
            .insert(key.to_string(), Entry { value, cleanup })
        {
            previous.release();
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.entries.get(key).map(|e| e.value.as_os_str())
    }

    /// Mutable access to a stored value, keeping its cleanup action.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut OsString> {
        self.entries.get_mut(key).map(|e| &mut e.value)
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// End the session: release every value. Later calls are no-ops.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        for (_, entry) in self.entries.drain() {
            entry.release();
        }
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.end();
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .field("ended", &self.ended)
            .finish()
    }
}
