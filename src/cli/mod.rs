//! CLI module for ares-research
//!
//! Provides command-line interface parsing and handling for the ares-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ares-research - bounded multi-agent deep research
///
/// Turns a research question into a cited markdown report using a supervisor
/// that fans out tool-calling researchers against a local Ollama server.
#[derive(Parser, Debug)]
#[command(
    name = "ares-research",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "ares-research - bounded multi-agent deep research",
    long_about = "Turns a research question into a cited markdown report.\n\n\
                  A supervisor plans research tasks, runs a bounded number of tool-calling\n\
                  researchers in parallel, compresses their findings and synthesizes a report.",
    after_help = "EXAMPLES:\n    \
                  ares-research init                          # Write a default ares-research.toml\n    \
                  ares-research run \"compare EU heat pump subsidies\"\n    \
                  ares-research run --no-clarify --json \"...\" # Machine-readable output\n    \
                  ares-research config --validate             # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "ares-research.toml", global = true, env = "ARES_RESEARCH_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a question and print the report
    Run {
        /// The research request
        query: String,

        /// Never stop to ask a clarifying question
        #[arg(long)]
        no_clarify: bool,

        /// Print the full outcome as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Write a default ares-research.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
