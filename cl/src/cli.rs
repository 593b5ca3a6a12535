//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::{MAX_CHAIN_LENGTH, MIN_CHAIN_LENGTH};

/// CollabLab - sequential LLM idea refinement
#[derive(Parser)]
#[command(
    name = "cl",
    about = "Refine an idea through initiation, a chain of rewrites, and synthesis",
    version = env!("GIT_DESCRIBE"),
    after_help = log_location_help()
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: initiate, chain, synthesize
    Run {
        /// Seed idea
        idea: String,

        /// Number of chain rewrites (1-10, default from config)
        #[arg(short = 'n', long, value_parser = chain_length_parser())]
        chain_length: Option<u32>,

        /// Stop the chain if this many milliseconds pass
        #[arg(long)]
        deadline_ms: Option<u64>,

        /// Show the refined and chained ideas as well as the suggestion
        #[arg(short, long)]
        verbose: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Refine a seed idea (one model call)
    Initiate {
        /// Seed idea
        idea: String,
    },

    /// Run only the rewrite chain on an idea
    Orchestrate {
        /// Idea to start the chain from
        idea: String,

        /// Number of chain rewrites (1-10, default from config)
        #[arg(short = 'n', long, value_parser = chain_length_parser())]
        chain_length: Option<u32>,
    },

    /// Merge several ideas into one suggestion
    Synthesize {
        /// Ideas to merge
        #[arg(required = true, num_args = 1..)]
        ideas: Vec<String>,
    },
}

fn chain_length_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(MIN_CHAIN_LENGTH as i64..=MAX_CHAIN_LENGTH as i64)
}

/// Output format for run results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

fn log_location_help() -> String {
    format!("Logs are written to: {}", get_log_path().display())
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("collablab")
        .join("logs")
        .join("collablab.log");
    debug!(?path, "get_log_path: returning path");
    path
}
