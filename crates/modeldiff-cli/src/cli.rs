use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "modeldiff",
    about = "Structural diff of two JSON snapshots",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show Change, Add and Del entries between two documents
    Diff(DiffArgs),
    /// Check whether two documents are structurally equal
    Equal(EqualArgs),
}

/// The two snapshots being compared.
#[derive(Args)]
pub struct Snapshots {
    /// The new snapshot
    pub new: PathBuf,
    /// The old snapshot
    pub old: PathBuf,
}

#[derive(Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub snapshots: Snapshots,
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
    /// Record the new value on Add entries instead of null
    #[arg(long)]
    pub with_added_values: bool,
}

#[derive(Args)]
pub struct EqualArgs {
    #[command(flatten)]
    pub snapshots: Snapshots,
}
