//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Work timeline reconstruction.
///
/// Rebuilds a contributor's active work timeline from a punch-in/punch-out
/// timecard and the project's commit history, projecting commits onto a
/// compressed time axis that excludes unpunched intervals.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render the normalized commit timeline for a project.
    Report {
        /// Project directory holding the timecard and descriptor files.
        project_dir: PathBuf,

        /// Git repository to read commits from (defaults to the project
        /// directory).
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Limit commits to this subtree of the repository.
        #[arg(long)]
        subtree: Option<String>,

        /// Output JSON instead of the human-readable table.
        #[arg(long)]
        json: bool,
    },

    /// Check that every tracked-file commit falls inside a punched segment.
    Check {
        /// Project directory holding the timecard and descriptor files.
        project_dir: PathBuf,

        /// Git repository to read commits from (defaults to the project
        /// directory).
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Limit commits to this subtree of the repository.
        #[arg(long)]
        subtree: Option<String>,
    },
}
