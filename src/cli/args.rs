//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Calculate daily commissions for a multilevel partner network
#[derive(Parser, Debug)]
#[command(name = "commission")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug logging, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Enable verbose output with statistics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding a local .commission.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate commissions and write them as JSON
    Calculate {
        /// Input JSON file with partner data
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Output JSON file for commission results
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Reference date (YYYY-MM-DD or YYYY-MM), default: today
        #[arg(long)]
        date: Option<String>,
        /// Include network statistics in the output
        #[arg(long)]
        include_stats: bool,
    },

    /// Only validate input file structure without processing
    Validate {
        /// Input JSON file with partner data
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Show network statistics
    Stats {
        /// Input JSON file with partner data
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Show the network as tree
    Tree {
        /// Input JSON file with partner data
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
