use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sdb",
    about = "StatusDB client: reconcile documents and map barcode names",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ~/.ngi_config/statusdb.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON dump holding the databases
    #[arg(long, global = true, default_value = "statusdb.json")]
    pub dump: PathBuf,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Replace connection settings from the configuration file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConnectionArgs {
    #[arg(long, global = true)]
    pub url: Option<String>,
    #[arg(long, global = true)]
    pub port: Option<u16>,
    #[arg(long, global = true)]
    pub username: Option<String>,
    #[arg(long, global = true)]
    pub password: Option<String>,
    #[arg(long, global = true)]
    pub db: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Map a barcode name onto a project sample
    Match(MatchArgs),
    /// Save a document if its content changed
    Upsert(UpsertArgs),
    /// Show QC figures of a project's sample runs
    Qc(QcArgs),
    /// Show in-house and customer names of a project's samples
    Names(NamesArgs),
    /// List runs by storage status, or set a run's storage status
    Storage(StorageArgs),
}

#[derive(Args)]
pub struct MatchArgs {
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub barcode: String,
    /// Also try barcode names without a project id prefix
    #[arg(long)]
    pub extensive: bool,
    /// Accept relaxed matches without asking
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct UpsertArgs {
    /// Target database: projects, samples, flowcells or analysis
    #[arg(long)]
    pub database: String,
    /// JSON file holding the document
    #[arg(long)]
    pub document: PathBuf,
    /// Match the stored document by id instead of by name
    #[arg(long)]
    pub by_id: bool,
}

#[derive(Args)]
pub struct QcArgs {
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub flowcell: Option<String>,
}

#[derive(Args)]
pub struct NamesArgs {
    #[arg(long)]
    pub project: String,
    /// Include the barcode sequence
    #[arg(long)]
    pub barcode_seq: bool,
}

#[derive(Args)]
pub struct StorageArgs {
    #[arg(long)]
    pub status: String,
    /// Set the storage status of the run with this document id
    #[arg(long)]
    pub set: Option<String>,
}
