//! Privilege primitive error types.

use std::io;

/// Errors that can occur while running a child under a dropped identity.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Program or argument unusable as an exec argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Pipe setup, fork, privilege drop or exec failed.
    #[error("spawn failed: {0}")]
    Spawn(#[source] io::Error),

    /// Reading the child's standard output failed.
    #[error("reading child output failed: {0}")]
    Read(#[source] io::Error),

    /// waitpid() failed.
    #[error("waitpid failed: {0}")]
    Wait(#[source] io::Error),
}

/// Errors that can occur while switching the filesystem identity.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The process could not assume the requested identity.
    #[error("cannot assume filesystem identity {uid}/{gid}: {source}")]
    Assume {
        uid: u32,
        gid: u32,
        #[source]
        source: io::Error,
    },
}
