//! CLI interface for scan-alerts
//!
//! Provides subcommands for:
//! - `run`: Scan the spool directory on an interval until ctrl-c
//! - `replay`: Run one aggregation/dispatch cycle over a recorded batch
//! - `config`: Show the effective configuration

mod replay;
mod run;

pub use replay::{ReplayArgs, ReplayBatch};
pub use run::{build_scanner, RunArgs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scan-alerts")]
#[command(about = "Aggregate scanner signals and dispatch throttled alerts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scanner loop
    Run(RunArgs),
    /// Run one cycle over a JSON batch of signals
    Replay(ReplayArgs),
    /// Show the effective configuration
    Config,
}
