//! Command-line interface definition for the ChitChat client
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication, conversation listing, and
//! interactive chat.

use clap::{Parser, Subcommand};

/// ChitChat - terminal direct-messaging client
///
/// Authenticate against a ChitChat server, browse your conversations,
/// start new ones, and exchange messages from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "chitchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Override the server base URL from config
    #[arg(long, env = "CHITCHAT_BASE_URL")]
    pub server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the ChitChat client
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store the credential in the OS keyring
    Login {
        /// Username to authenticate as
        #[arg(short, long)]
        username: String,

        /// Password (prompted interactively when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create a new account (does not log in)
    Register {
        /// Username to register
        #[arg(short, long)]
        username: String,

        /// Password (prompted interactively when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Clear the stored credential
    Logout,

    /// Show the current session
    Whoami,

    /// List conversations and candidate users
    Chats,

    /// Open a conversation and chat interactively
    Chat {
        /// Conversation id to open (from `chitchat chats`)
        #[arg(short = 'i', long, conflicts_with = "with")]
        id: Option<i64>,

        /// Start (or reuse) a conversation with this username
        #[arg(short, long)]
        with: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
