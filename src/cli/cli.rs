use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Runs a tree script against an in-memory file tree and prints the outcome.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The directory holding `tree.yaml`
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Script to run instead of `tree.yaml` in the root directory
    #[clap(long, short)]
    pub script: Option<PathBuf>,

    /// Audit the tree after every mutation and fail on an inconsistency
    #[clap(long)]
    pub check: bool,
}
