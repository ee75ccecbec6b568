//! Command line interface definition

use clap::{Parser, Subcommand};
use filever_types::ColorChoice;
use std::path::PathBuf;

/// filever - verify files against a recorded hash index
#[derive(Parser)]
#[command(name = "filever")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify files against a recorded hash index and locate differences between copies")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write JSON debug logs to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Re-check every file recorded in an index (size and digest)
    #[command(alias = "v")]
    Verify {
        /// Path to the CLIXML index produced by the indexer
        #[arg(long, value_name = "PATH")]
        index: PathBuf,

        /// Number of concurrent workers (0 = auto)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Where to write mismatched paths, one per line
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Find which byte windows differ between two or more copies of a file
    Splits {
        /// Number of equal windows over the common prefix
        #[arg(long)]
        splits: Option<usize>,

        /// Digest algorithm (SHA256, SHA1, SHA384, SHA512, MD5)
        #[arg(long, value_name = "NAME")]
        alg: Option<String>,

        /// Files to compare; the first is the reference
        #[arg(required = true, num_args = 2.., value_name = "FILE")]
        files: Vec<PathBuf>,
    },
}
