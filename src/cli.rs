use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "scenebot",
    about = "Index APK directory listings and serve them over Telegram",
    version
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(global = true, long, short)]
    pub verbose: bool,

    /// Path to config.json (defaults to the user config directory)
    #[arg(global = true, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every build on every configured source
    List,

    /// Show the latest build across all sources
    Latest,

    /// Find the first build whose name contains a keyword
    Find {
        /// Case-insensitive keyword; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        keyword: Vec<String>,
    },

    /// Show configured sources
    Sources,

    /// Run the Telegram bot (long polling)
    Serve,

    /// Manage builds registered from admin uploads
    Uploads {
        #[command(subcommand)]
        command: UploadsCommand,
    },
}

#[derive(Subcommand)]
pub enum UploadsCommand {
    /// List registered uploads
    List,

    /// Register a file name -> Telegram file id mapping
    Register {
        /// File name (stored lowercase)
        name: String,
        /// Telegram file id
        handle: String,
    },

    /// Remove a registered upload
    Remove {
        /// File name (case-insensitive)
        name: String,
    },
}
