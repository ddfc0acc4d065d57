//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Project-HUB server and administration tool
#[derive(Parser, Debug)]
#[command(name = "hub", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "HUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the API server
    Serve {
        /// Keep all data in memory and use an in-memory media host
        #[arg(long)]
        ephemeral: bool,
    },

    /// Inspect or edit the configuration file
    Config {
        /// Config subcommand
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage accounts directly in the configured store
    Admin {
        /// Admin subcommand
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// `hub config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the config file path in use
    Path,

    /// Print a value by dotted key, e.g. `server.port`
    Get {
        /// Dotted key
        key: String,
    },

    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value; booleans and numbers are detected
        value: String,
    },

    /// Write a default config file
    Init {
        /// Where to write it (defaults to the standard location)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the settings as `HUB_*` environment variables
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}

/// `hub admin` subcommands.
#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Create an admin account
    Create {
        /// Display name
        #[arg(long)]
        name: String,
        /// Login email
        #[arg(long)]
        email: String,
        /// Password
        #[arg(long, env = "HUB_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Give an existing account the admin role
    Promote {
        /// Login email of the account
        #[arg(long)]
        email: String,
    },
}
