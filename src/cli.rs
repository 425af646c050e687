//! Command-line interface based on clap.
//!
//! [`Cli`] carries the global flags (`--config`, `--json`, `--verbose`) and a
//! [`Command`]: `sync` reconciles the tracking issue, `find` only reports it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Keep one up-to-date tracking issue for a repository scan.
#[derive(Debug, Parser)]
#[command(name = "lintrack", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./lintrack.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print a JSON report on stdout instead of colored text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Which repository and which issues to look at.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Repository as `owner/name`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: String,

    /// Label that marks tracking issues.
    #[arg(long)]
    pub label_name: Option<String>,

    /// Login that opened the tracking issues (defaults to the token's user).
    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, update or close the tracking issue for this run.
    Sync {
        #[command(flatten)]
        target: TargetArgs,

        /// Sequence number of the current job run.
        #[arg(long, env = "GITHUB_RUN_NUMBER")]
        run_number: u64,

        /// File holding the formatted scan report, or `-` for stdin.
        #[arg(long)]
        content: Option<PathBuf>,

        /// Title used when a new issue is opened.
        #[arg(long)]
        title: Option<String>,

        /// Color used if the label has to be created.
        #[arg(long)]
        label_color: Option<String>,

        /// User to assign new issues to.
        #[arg(long)]
        assignee: Option<String>,

        /// The scan passed: close the tracking issue.
        #[arg(long, default_value_t = false)]
        close: bool,

        /// Always open a new issue, closing the current one.
        #[arg(long, default_value_t = false)]
        force_create: bool,
    },

    /// Show the current tracking issue without changing anything.
    Find {
        #[command(flatten)]
        target: TargetArgs,
    },
}
