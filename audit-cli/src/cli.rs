use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Track audit requests (permintaan) and their evidence (bukti)"
)]
pub struct Cli {
    /// Seed snapshot (YAML or JSON) to start from
    #[clap(long, short = 's')]
    pub seed: Option<PathBuf>,

    /// Days before a due date at which pending requests are flagged
    #[clap(long, short = 'w')]
    pub warning_days: Option<i64>,

    /// Log debug output to stderr
    #[clap(long, short = 'v')]
    pub verbose: bool,

    /// Defaults to the interactive shell
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show summary statistics and per-project breakdowns
    Dashboard,

    /// List requests grouped by audit project
    List {
        /// Only show this project (e.g., PROJ-01)
        #[clap(long, short = 'p')]
        project: Option<String>,
    },

    /// List the evidence bank
    Evidence,

    /// Write fulfilled requests to permintaan_terpenuhi.csv
    Export {
        /// Output directory (defaults to the configured export directory, then the current one)
        #[clap(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Dump projects, requests and evidence to a JSON file
    ExportJson {
        /// Output file
        #[clap(long, short = 'o', default_value = "audit-snapshot.json")]
        output: PathBuf,
    },

    /// Save the file attached to an evidence item
    Attachment {
        /// Evidence id (e.g., BKT-001)
        id: String,

        /// Output directory
        #[clap(long, short = 'o', default_value = ".")]
        output: PathBuf,
    },

    /// Interactive session for adding, editing and deleting entries
    Shell,
}
