use clap::{Args, Parser, Subcommand};
use music_tidy::ops::ReplayKind;
use music_tidy::LogFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "music-tidy")]
#[command(about = "Validate, tag, and reorganize a music library", long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of ./Config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the structured event log goes for this run.
#[derive(Debug, Args)]
pub struct JournalArgs {
    /// Event log file (defaults to `journal_path` from the configuration)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Event log format: json or text
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Append to the event log instead of starting a fresh one
    #[arg(long)]
    pub append: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every folder under the given paths as good or bad
    Validate {
        /// Folders to scan (defaults to `library_root`)
        paths: Vec<String>,
        /// Additional path prefixes to skip
        #[arg(long)]
        skip: Vec<String>,
        /// Only list good artist folders
        #[arg(long, conflicts_with = "bad_only")]
        good_only: bool,
        /// Only list bad folders
        #[arg(long)]
        bad_only: bool,
        #[command(flatten)]
        journal: JournalArgs,
    },
    /// Describe how each folder under a path is organized
    Analyze {
        path: Option<PathBuf>,
        #[command(flatten)]
        journal: JournalArgs,
    },
    /// Write tags derived from folder and file names into good artist folders
    Tag {
        path: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
        /// Genre applied to every tagged file
        #[arg(long)]
        genre: Option<String>,
        /// Comment applied to every tagged file
        #[arg(long)]
        comment: Option<String>,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        journal: JournalArgs,
    },
    /// Move good artist folders under a destination, merging with existing ones
    Move {
        path: Option<PathBuf>,
        /// Destination root (defaults to `destination_root`)
        #[arg(short, long)]
        destination: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        journal: JournalArgs,
    },
    /// Merge one folder into another
    Merge {
        src: PathBuf,
        dst: PathBuf,
        #[arg(long)]
        dry_run: bool,
        #[arg(short, long)]
        yes: bool,
    },
    /// Re-apply an action to the good folders recorded in an event log
    Replay {
        /// Event log from an earlier validate run
        log: PathBuf,
        /// tag or move
        #[arg(long)]
        action: ReplayKind,
        #[arg(short, long)]
        destination: Option<PathBuf>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        dry_run: bool,
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        journal: JournalArgs,
    },
    /// Count the entries of an event log by status, reason, and function
    Summarize {
        log: PathBuf,
        /// Also export the entries as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// List the paths recorded under each status
        #[arg(long)]
        paths: bool,
    },
    /// Print configuration values
    PrintConfig,
}
