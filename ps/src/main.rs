use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use prefstore::PreferenceStore;
use prefstore::cli::{Cli, Command};
use prefstore::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn open_store(store_path: &Path, config: &Config) -> Result<PreferenceStore> {
    let store = PreferenceStore::open(store_path)
        .context(format!("Failed to open store at {}", store_path.display()))?
        .with_max_destinations(config.max_destinations);
    Ok(store)
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path.clone());

    info!("prefstore starting at {}", store_path.display());

    match cli.command {
        Command::Show { user_id, json } => {
            let store = open_store(&store_path, &config)?;
            match store.load(&user_id) {
                Some(record) if json => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                Some(record) => {
                    println!("User: {}", user_id.cyan());
                    println!("  Preferences: {}", record.preferences);
                    println!("  Hobbies: {}", record.hobbies);
                    if record.past_destinations.is_empty() {
                        println!("  Past destinations: {}", "(none)".dimmed());
                    } else {
                        println!("  Past destinations: {}", record.past_destinations.join(", "));
                    }
                }
                None => {
                    println!("No saved preferences for {}", user_id.yellow());
                }
            }
        }
        Command::List => {
            let store = open_store(&store_path, &config)?;
            let users = store.users()?;
            if users.is_empty() {
                println!("No saved preferences");
            } else {
                for user in users {
                    println!("{}", user);
                }
            }
        }
        Command::Forget { user_id } => {
            let store = open_store(&store_path, &config)?;
            if store.forget(&user_id)? {
                println!("{} Forgot preferences for {}", "✓".green(), user_id);
            } else {
                println!("No saved preferences for {}", user_id.yellow());
            }
        }
        Command::Path => {
            println!("{}", store_path.display());
        }
    }

    Ok(())
}
