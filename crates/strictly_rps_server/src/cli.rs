//! Command-line interface for strictly_rps.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly RPS - rock-paper-scissors round ledger
#[derive(Parser, Debug)]
#[command(name = "strictly_rps")]
#[command(about = "Record and analyze rock-paper-scissors rounds", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (migrates and seeds the roster first)
    Serve {
        /// Path to the TOML config file (defaults are used if missing)
        #[arg(short, long, default_value = "strictly_rps.toml")]
        config: PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Database path (overrides config and DATABASE_URL)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Apply migrations and seed the roster, then exit
    Seed {
        /// Path to the TOML config file (defaults are used if missing)
        #[arg(short, long, default_value = "strictly_rps.toml")]
        config: PathBuf,

        /// Database path (overrides config and DATABASE_URL)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Resolve a single round offline, e.g. `resolve alice=rock bob=paper`
    Resolve {
        /// Entries as NAME=MOVE
        #[arg(required = true, num_args = 1..)]
        entries: Vec<String>,
    },
}
