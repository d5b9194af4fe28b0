//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;

/// Travel Agent - LLM-driven trip planner
#[derive(Parser)]
#[command(
    name = "ta",
    about = "Plan a trip with an LLM-driven research and itinerary pipeline",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `plan`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip (prompts for anything not given as a flag)
    Plan(PlanArgs),

    /// List the tools the model can call
    Tools {
        /// Print each tool's JSON input schema
        #[arg(short, long)]
        schema: bool,
    },

    /// Show what is remembered about a traveler
    Prefs {
        /// User id the preferences are stored under
        user_id: String,
    },
}

/// Trip details that skip their interactive prompt when given
#[derive(Debug, Clone, Default, Args)]
pub struct PlanArgs {
    /// User id for preference memory (empty = do not remember)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Where the trip starts
    #[arg(long = "from", value_name = "CITY")]
    pub source: Option<String>,

    /// Where the trip goes
    #[arg(long = "to", value_name = "CITY")]
    pub destination: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long = "start", value_name = "DATE")]
    pub start_date: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long = "end", value_name = "DATE")]
    pub end_date: Option<String>,

    /// Travel preferences (budget, pace, style)
    #[arg(short, long)]
    pub preferences: Option<String>,

    /// Hobbies and interests
    #[arg(long)]
    pub hobbies: Option<String>,

    /// Print the plan without saving it to a file
    #[arg(long)]
    pub no_save: bool,
}

/// Default log file location
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("travelagent")
        .join("logs")
        .join("travelagent.log")
}

/// Generate the after_help text with API key checks and the log location
pub fn generate_after_help(config: &Config) -> String {
    debug!("generate_after_help: called");
    let missing = config.missing_keys();

    let mut help = String::from("API Keys:\n");
    let mut keys = vec![config.llm.api_key_env.as_str()];
    if config.search.enabled {
        keys.push(config.search.api_key_env.as_str());
    }
    for key in keys {
        let icon = if missing.iter().any(|m| m == key) {
            "\u{274C}"
        } else {
            "\u{2705}"
        };
        help.push_str(&format!("  {} {}\n", icon, key));
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}
