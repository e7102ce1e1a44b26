//! CLI argument parsing.

use clap::{Parser, Subcommand, ValueEnum};
use xauthfwd_core::{AclDecision, Direction};

/// xauthfwd - forward an X authority cookie to another user
#[derive(Parser, Debug)]
#[command(name = "xauthfwd", version, about)]
pub struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate one allow-list
    Acl {
        /// Which list to consult
        #[arg(value_enum)]
        direction: DirectionArg,

        /// Owner of the list
        subject: String,

        /// User looked up in the list
        object: String,

        /// Decision when the list does not exist
        #[arg(long, value_enum, default_value = "permit")]
        default: DefaultArg,
    },

    /// Open a forwarding session for a target user, then close it
    Forward {
        /// Account receiving the cookie
        target: String,

        /// Leave the forwarded file in place instead of closing the session
        #[arg(long)]
        keep: bool,

        /// Module options (debug, xauthpath=, targetuser=, systemuser=)
        #[arg(last = true)]
        options: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Export,
    Import,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Export => Direction::Export,
            DirectionArg::Import => Direction::Import,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DefaultArg {
    Permit,
    Deny,
}

impl From<DefaultArg> for AclDecision {
    fn from(arg: DefaultArg) -> Self {
        match arg {
            DefaultArg::Permit => AclDecision::Permit,
            DefaultArg::Deny => AclDecision::Deny,
        }
    }
}
