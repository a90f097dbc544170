//! WattBuddy - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use wattbuddy::{
    cli::{Args, Commands},
    config::Config,
    logging,
    rag::{EventBus, RagPipeline, RunOutcome},
    repl::{self, DisplayManager, ReplSession},
    KnowledgeBase,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbosity());

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };

    match args.command() {
        Commands::Ask { query } => run_ask(&config, &query.join(" ")).await,
        Commands::Start => run_repl(&config).await,
        Commands::Kb => show_knowledge(&config),
        Commands::Config => {
            show_config(&config);
            Ok(())
        }
    }
}

/// Answer a single question and exit
async fn run_ask(config: &Config, query: &str) -> Result<()> {
    match repl::ask_once(config, query).await? {
        Some(RunOutcome::Failed { error, .. }) => Err(error.into()),
        _ => Ok(()),
    }
}

/// Run the interactive REPL
async fn run_repl(config: &Config) -> Result<()> {
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wattbuddy")
        .join("history");

    let (bus, events) = EventBus::new();
    let pipeline = RagPipeline::from_config(config, Arc::new(bus))?;

    let mut session = ReplSession::with_history(history_path, pipeline, events)?;
    session.run(VERSION, &config.llm.model).await
}

fn show_knowledge(config: &Config) -> Result<()> {
    let knowledge = match &config.knowledge.path {
        Some(path) => KnowledgeBase::from_file(path)?,
        None => KnowledgeBase::builtin(),
    };
    DisplayManager::new().show_sources(&knowledge);
    Ok(())
}

fn show_config(config: &Config) {
    println!("\n{}", "WattBuddy Configuration".bold().cyan());
    println!("{}", "=".repeat(60).cyan());

    if let Ok(path) = Config::config_path() {
        println!("  {:<20} {}", "File:".green(), path.display());
    }

    println!("\n{}", "[llm]".bold());
    println!("  {:<20} {}", "endpoint".green(), config.llm.endpoint);
    println!("  {:<20} {}", "model".green(), config.llm.model);
    println!("  {:<20} {}", "referer".green(), config.llm.referer);
    println!("  {:<20} {}", "title".green(), config.llm.title);
    println!("  {:<20} {}", "api_key".green(), config.masked_api_key());

    println!("\n{}", "[pipeline]".bold());
    println!("  {:<20} {}", "analyze_delay_ms".green(), config.pipeline.analyze_delay_ms);
    println!("  {:<20} {}", "retrieve_delay_ms".green(), config.pipeline.retrieve_delay_ms);
    println!("  {:<20} {}", "greeting".green(), config.pipeline.greeting);

    println!("\n{}", "[knowledge]".bold());
    match &config.knowledge.path {
        Some(path) => println!("  {:<20} {}", "path".green(), path.display()),
        None => println!("  {:<20} {}", "path".green(), "(built-in)".dimmed()),
    }
    println!();
}
