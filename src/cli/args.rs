//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Military-history assistant backend
#[derive(Parser, Debug)]
#[command(name = "zhuge-server")]
#[command(version, about = "Military-history assistant API server", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Address to bind (overrides config and ZHUGE_HOST)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to bind (overrides config and ZHUGE_PORT)
    #[arg(long, short, global = true)]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show effective configuration with keys redacted
    Show,
    /// Create default config file
    Init,
}
