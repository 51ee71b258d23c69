//! CLI argument parsing for aether-tui.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aether-tui")]
#[command(about = "Aether launcher in the terminal", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug logging (logs to $TMPDIR/aether-tui.log)
    #[arg(short, long)]
    pub debug: bool,

    /// Config file to use instead of ~/.config/aether-launcher/config.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebSocket endpoint answering queries
    #[arg(long)]
    pub query_url: Option<String>,

    /// HTTP endpoint accepting launch requests
    #[arg(long)]
    pub launch_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive TUI mode (default)
    Tui,

    /// One-shot query, prints the reply
    Query {
        /// Query text
        query: String,
    },
}
