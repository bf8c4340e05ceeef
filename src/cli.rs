use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "leafwatch", version, about = "Plant leaf disease classifier client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding settings.json and the history database.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Settings file to use instead of `<data-dir>/settings.json`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Prediction API base URL for this run.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch the camera and classify leaves as they are shown.
    Watch,
    /// Classify an image file.
    Classify { path: PathBuf },
    /// Browse or edit past predictions.
    #[command(subcommand)]
    History(HistoryCommand),
    /// Check whether the prediction API is reachable.
    Status,
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    List,
    Show { id: String },
    Remove { id: String },
    /// Delete every entry.
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    /// Persist the prediction API base URL.
    SetApiUrl { url: String },
}
