//! snapvc - simple local file versioning.
//!
//! This is the main entry point for the snapvc CLI.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use snapvc_util::log::{self, LogConfig, LogLevel};

#[derive(Parser)]
#[command(name = "snapvc")]
#[command(author, version, about = "Simple local file versioning", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new repository in the current directory
    Init,
    /// Start tracking a file
    Track {
        /// File to track
        file: String,
    },
    /// Stop tracking a file
    Untrack {
        /// File to untrack
        file: String,
    },
    /// List tracked files and their state
    Status,
    /// List files in the working tree
    Find,
    /// Show changes against the latest saved version
    Diff {
        /// File to diff
        file: String,
    },
    /// Save a new version of a file
    Save {
        /// File to save
        file: String,
    },
    /// Revert a file to a saved version (latest when omitted)
    Revert {
        /// File to revert
        file: String,
        /// Version to revert to
        version: Option<u32>,
    },
    /// Show the full version history
    History,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version requests are not errors; everything else
            // (unknown commands, bad arguments) exits 1.
            if err.use_stderr() {
                eprint!("{err}");
                std::process::exit(1);
            }
            print!("{err}");
            std::process::exit(0);
        }
    };

    log::init(LogConfig {
        print: cli.verbose,
        level: if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        },
    });

    if let Err(err) = commands::run(cli.command) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}
