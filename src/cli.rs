use crate::config::DEFAULT_CONFIG_FILE;
use crate::io::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bumpscope")]
#[command(
    about = "Recommend a semantic version bump from contract changes between two git revisions",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE, env = "BUMPSCOPE_CONFIG")]
    pub config: PathBuf,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two revisions and print the suggested bump
    Decide {
        /// Base revision
        #[arg(long, default_value = "HEAD^")]
        base: String,

        /// Head revision
        #[arg(long, default_value = "HEAD")]
        head: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Enable an analyzer in addition to the configured ones
        #[arg(long = "enable-analyzer", value_name = "NAME")]
        enable_analyzer: Vec<String>,

        /// Disable an analyzer even if configured
        #[arg(long = "disable-analyzer", value_name = "NAME")]
        disable_analyzer: Vec<String>,

        /// Repository path (any directory inside the work tree)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// List registered analyzers
    Analyzers,

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}
