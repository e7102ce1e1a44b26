//! X authority cookie forwarding across a user switch.
//!
//! When a user switches to another account (su, sudo, a login manager), the
//! target account cannot talk to the invoker's X display without the
//! invoker's cookie. This crate copies that cookie into a fresh authority
//! file owned by the target, publishes it as `XAUTHORITY`, and removes it
//! again when the session closes.
//!
//! The host stack supplies:
//! - an [`IdentityResolver`] (normally [`PasswdResolver`])
//! - a [`SessionEnv`] that receives `XAUTHORITY` and `DISPLAY`
//! - a [`SessionStore`] that survives from session open to session close
//!
//! # Example
//!
//! ```no_run
//! use xauthfwd_session::{
//!     close_session, current_caller, open_session, PasswdResolver, SessionEnv, SessionStore,
//! };
//!
//! let mut env = SessionEnv::from_process();
//! let mut store = SessionStore::new();
//! let args = ["debug", "xauthpath=/usr/bin/xauth"];
//!
//! open_session(&args, "bob", current_caller(), &mut env, &mut store, &PasswdResolver);
//! // ... session runs ...
//! close_session(&args, &mut store);
//! ```

mod acl;
mod authfile;
mod entry;
mod env;
mod error;
mod forward;
mod passwd;
mod store;
mod teardown;

pub use acl::{allow_list_path, scan_allow_list, AclEvaluator};
pub use entry::{close_session, load_config, open_session};
pub use env::SessionEnv;
pub use error::ForwardError;
pub use forward::{Forwarder, OpenOutcome};
pub use passwd::{IdentityResolver, PasswdResolver, ResolveError};
pub use store::{Cleanup, SessionStore, StoreError};
pub use teardown::teardown;

use xauthfwd_core::Caller;

/// Real user and group ids of this process.
pub fn current_caller() -> Caller {
    unsafe { Caller::new(libc::getuid(), libc::getgid()) }
}
