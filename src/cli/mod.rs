// src/cli/mod.rs
use clap::Parser;

pub mod commands;
pub mod menu;

pub use commands::CliCommand;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database URL
    #[arg(long, short, env = "DATABASE_URL", default_value = "sqlite:./data/familytree.db")]
    pub db: String,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// API server port
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Run in API-only mode (no administrator CLI)
    #[arg(long)]
    pub api_only: bool,
}
