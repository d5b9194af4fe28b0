//! CLI argument parsing for prefstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ps")]
#[command(author, version, about = "Inspect and manage saved travel preferences", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the store directory
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the saved preferences for a user
    Show {
        /// User ID
        #[arg(required = true)]
        user_id: String,

        /// Print the raw JSON record
        #[arg(long)]
        json: bool,
    },

    /// List all users with saved preferences
    List,

    /// Delete the saved preferences for a user
    Forget {
        /// User ID
        #[arg(required = true)]
        user_id: String,
    },

    /// Print the store directory
    Path,
}
