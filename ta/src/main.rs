//! Travel Agent - LLM-driven trip planner
//!
//! CLI entry point: collects trip details, runs the planning pipeline and
//! saves the result.

use std::fs;
use std::io;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use prefstore::PreferenceStore;
use travelagent::cli::{Cli, Command, PlanArgs, generate_after_help, get_log_path};
use travelagent::config::Config;
use travelagent::intake::{EditorReader, Intake, TripIntake};
use travelagent::llm::create_client;
use travelagent::output::save_plan;
use travelagent::pipeline::{Pipeline, StepContext, StepEvent, StepSettings};
use travelagent::prompts::PromptLoader;
use travelagent::tools::ToolRegistry;

const RULE: &str = "============================================================";

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // API keys may live in .env
    let _ = dotenvy::dotenv();

    // Build command with dynamic after_help that shows API key checks
    let help_config = Config::load(None).unwrap_or_default();
    let cmd = Cli::command().after_help(generate_after_help(&help_config));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("Travel agent loaded config: model={}", config.llm.model);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => cmd_plan(&config, PlanArgs::default()).await,
        Some(Command::Plan(args)) => cmd_plan(&config, args).await,
        Some(Command::Tools { schema }) => cmd_tools(&config, schema),
        Some(Command::Prefs { user_id }) => cmd_prefs(&config, &user_id),
    }
}

/// Collect trip details, run the pipeline, print and save the plan
async fn cmd_plan(config: &Config, args: PlanArgs) -> Result<()> {
    debug!(?args, "cmd_plan: called");

    let missing = config.missing_keys();
    if !missing.is_empty() {
        debug!(?missing, "cmd_plan: missing API keys");
        eprintln!("{}", "Error: Missing required environment variables:".red());
        for key in &missing {
            eprintln!("  - {}", key);
        }
        eprintln!("\nSet them in your environment or in a .env file.");
        std::process::exit(1);
    }
    config.validate()?;

    println!("\n{}", RULE);
    println!("{}", "Welcome to the AI Travel Agent!".bright_cyan().bold());
    println!("{}\n", RULE);

    let mut reader = EditorReader::new()?;
    let mut stdout = io::stdout();
    let state = match TripIntake::new(&mut reader, &mut stdout).collect(&args)? {
        Intake::Ready(state) => *state,
        Intake::Cancelled => {
            debug!("cmd_plan: intake cancelled");
            println!("\n\nTravel planning cancelled. Goodbye!");
            return Ok(());
        }
    };
    let destination = state.destination.clone();

    let ctx = build_context(config)?;
    let pipeline = Pipeline::travel()?;

    println!("\n{}", RULE);
    println!("Creating your personalized travel plan for {}...", destination.bright_green());
    println!("This may take a few minutes while the trip is researched and planned.");
    println!("{}\n", RULE);

    let run = pipeline.run_observed(state, &ctx, print_progress);
    let result = tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            debug!("cmd_plan: interrupted during pipeline");
            println!("\n\nTravel planning cancelled. Goodbye!");
            return Ok(());
        }
    };

    let final_state = match result {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "cmd_plan: pipeline failed");
            eprintln!("\n\n{} {}", "An error occurred:".red(), e);
            eprintln!("Please try again or check your configuration.");
            std::process::exit(1);
        }
    };

    let plan = final_state.final_plan.unwrap_or_default();
    println!("\n{}", RULE);
    println!("{}", "YOUR PERSONALIZED TRAVEL PLAN".bright_cyan().bold());
    println!("{}\n", RULE);
    println!("{}", plan);
    println!("\n{}\n", RULE);

    for notice in ctx.notices() {
        println!("{} {}", "!".yellow(), notice);
    }

    if args.no_save || !config.output.save_plan {
        debug!("cmd_plan: saving disabled");
    } else {
        let path = save_plan(&config.output.dir, &plan, &destination)?;
        println!("Your travel plan has been saved to: {}", path.display());
    }

    let usage = ctx.usage();
    println!(
        "{}",
        format!(
            "{} LLM calls, {} tool calls in {} rounds, {} in / {} out tokens (~${:.4})",
            usage.llm_calls,
            usage.tool_calls,
            usage.tool_rounds,
            usage.tokens.input_tokens,
            usage.tokens.output_tokens,
            usage.tokens.cost_usd(&config.llm.model)
        )
        .dimmed()
    );
    println!("\nHave a wonderful trip!");
    Ok(())
}

/// Wire up the LLM client, tools, prompts and preference store
fn build_context(config: &Config) -> Result<StepContext> {
    debug!("build_context: called");
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let tools = Arc::new(ToolRegistry::travel(&config.search).context("Failed to set up tools")?);
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let prompts = Arc::new(PromptLoader::new(&cwd));
    let store = Arc::new(open_store(config));

    Ok(StepContext::new(llm, tools, prompts, store).with_settings(StepSettings::from_config(config)))
}

/// Open the preference store, falling back to one that remembers nothing
fn open_store(config: &Config) -> PreferenceStore {
    if !config.memory.enabled {
        debug!("open_store: memory disabled");
        return PreferenceStore::null();
    }
    match PreferenceStore::open(&config.memory.store_dir) {
        Ok(store) => store.with_max_destinations(config.memory.max_destinations),
        Err(e) => {
            warn!(error = %e, dir = %config.memory.store_dir.display(), "open_store: falling back to no memory");
            eprintln!(
                "{} Preference memory unavailable ({}); continuing without it",
                "!".yellow(),
                e
            );
            PreferenceStore::null()
        }
    }
}

fn print_progress(event: StepEvent) {
    match event {
        StepEvent::Started { name, index, total } => {
            println!("{} {}...", format!("[{}/{}]", index + 1, total).dimmed(), name.replace('_', " "));
        }
        StepEvent::Finished { name, elapsed, .. } => {
            println!(
                "      {} {} ({:.1}s)",
                "\u{2713}".green(),
                name.replace('_', " "),
                elapsed.as_secs_f64()
            );
        }
    }
}

/// List the tools the model can call
fn cmd_tools(config: &Config, schema: bool) -> Result<()> {
    debug!(schema, "cmd_tools: called");
    let registry = ToolRegistry::travel(&config.search).context("Failed to set up tools")?;

    println!("Available tools:");
    println!();
    for definition in registry.definitions() {
        println!("  {}", definition.name.yellow());
        println!("    {}", definition.description);
        if schema {
            let pretty = serde_json::to_string_pretty(&definition.input_schema)?;
            for line in pretty.lines() {
                println!("    {}", line);
            }
        }
        println!();
    }
    Ok(())
}

/// Show what is remembered about a traveler
fn cmd_prefs(config: &Config, user_id: &str) -> Result<()> {
    debug!(%user_id, "cmd_prefs: called");
    let store = PreferenceStore::open(&config.memory.store_dir)
        .context(format!(
            "Failed to open preference store at {}",
            config.memory.store_dir.display()
        ))?
        .with_max_destinations(config.memory.max_destinations);

    match store.load(user_id) {
        Some(record) => {
            println!("User: {}", user_id.cyan());
            println!("{}", record.summary());
        }
        None => println!("No saved preferences for {}", user_id.yellow()),
    }
    Ok(())
}
