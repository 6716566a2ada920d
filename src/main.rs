mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventboard_core::config::EventBoardConfig;
use eventboard_core::source::{EventSource, JsonFileSource};
use eventboard_core::{FilterEngine, QueryParams, TracingSink};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eventboard")]
#[command(about = "Explore event listings through URL-driven filters")]
struct Cli {
    /// Static JSON file with the events (defaults to events_path from the config)
    #[arg(long, global = true)]
    events: Option<PathBuf>,

    /// Current query string, e.g. "location=SF|NYC&featured=true"
    #[arg(short, long, global = true, default_value = "")]
    query: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the filter options present in the events
    Filters,
    /// List events matching the query
    List {
        /// Group by month instead of by day
        #[arg(long)]
        months: bool,

        /// Print the full view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or remove a value of a multi-select filter (location, host, topic)
    Toggle { dimension: String, value: String },
    /// Set a single-select filter or the featured toggle; an empty value clears it
    Set { dimension: String, value: String },
    /// Limit to a date range
    Dates {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
    /// Remove every filter
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut engine = load_engine(cli.events, &cli.query)?;

    match cli.command {
        Commands::Filters => commands::filters::run(&engine),
        Commands::List { months, json } => commands::list::run(&engine, months, json),
        Commands::Toggle { dimension, value } => {
            let params = engine.toggle_multi_value(&dimension, &value);
            commands::mutate::report(&engine, &params)
        }
        Commands::Set { dimension, value } => {
            let params = engine.set_single_value(&dimension, &value);
            commands::mutate::report(&engine, &params)
        }
        Commands::Dates { start, end } => {
            commands::mutate::dates(&mut engine, start.as_deref(), end.as_deref())
        }
        Commands::Clear => {
            let params = engine.clear_all();
            commands::mutate::report(&engine, &params)
        }
    }
}

fn load_engine(events: Option<PathBuf>, query: &str) -> Result<FilterEngine<TracingSink>> {
    // An explicit events file means no config file is written on our behalf
    let (config, path) = match events {
        Some(path) => (EventBoardConfig::load_existing()?, path),
        None => {
            let config = EventBoardConfig::load()?;
            let path = config.events_path();
            (config, path)
        }
    };

    let events = JsonFileSource::new(&path)
        .load()
        .with_context(|| format!("Could not load events from {}", path.display()))?;

    debug!(
        path = %path.display(),
        events = events.len(),
        dimensions = config.dimensions.len(),
        "building filter engine"
    );

    Ok(FilterEngine::with_sink(
        events,
        &config.dimensions,
        &QueryParams::parse(query),
        TracingSink,
    ))
}
