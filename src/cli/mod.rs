pub mod config;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A3S Workbench - Chat, code generation and writing helpers over pluggable AI integrations
#[derive(Debug, Parser)]
#[command(name = "a3s-workbench", version, about)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "A3S_WORKBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host address to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Print the built-in defaults instead
        #[arg(long)]
        default: bool,
    },
}
