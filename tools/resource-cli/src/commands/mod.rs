//! CLI command implementations.

pub mod cache;
pub mod config;
pub mod fetch;

use clap::{Args, Subcommand};

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// Resource name (built-in `app-config` / `statistics`, or configured).
    pub name: String,

    /// Print the decoded payload.
    #[arg(short, long)]
    pub body: bool,

    /// Write the response payload to a file.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// List known resources and whether they are cached.
    List,
    /// Show the cached entry of a resource.
    Show {
        /// Resource name.
        name: String,
    },
    /// Drop the cached entry of a resource.
    Invalidate {
        /// Resource name.
        name: String,
    },
    /// Drop every cached entry.
    Clear,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
