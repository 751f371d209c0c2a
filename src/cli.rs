use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ffplan")]
#[command(about = "HEVC transcode planner for NVENC", long_about = None)]
pub struct Cli {
    /// Path to a policy TOML file (defaults to the user config location)
    #[arg(long, global = true, value_name = "FILE")]
    pub policy: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one probe document and print the decision
    Plan {
        /// Path to an ffprobe JSON document
        probe: PathBuf,

        /// Emit the decision as JSON instead of the transcript
        #[arg(long)]
        json: bool,
    },

    /// Evaluate every probe document (*.json) under a directory
    Scan {
        /// Directory to scan (defaults to current directory)
        directory: Option<PathBuf>,
    },

    /// List the built-in quality profiles
    Profiles,

    /// Show policy status and location, or create a default policy if missing
    InitConfig,
}

pub fn parse() -> Cli {
    Cli::parse()
}
