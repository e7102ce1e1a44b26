//! CLI commands.

pub mod acl;
pub mod forward;

pub use acl::check_acl;
pub use forward::forward;
