//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use super::output::{Output, OutputFormat};
use super::{cache_cmd, line, section, station};
use crate::logging;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "subway")]
#[command(author, version, about = "Manage subway lines as ordered chains of sections")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new subway project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage stations
    #[command(subcommand)]
    Station(station::StationCommands),

    /// Manage lines
    #[command(subcommand)]
    Line(line::LineCommands),

    /// Add and remove sections of a line
    #[command(subcommand)]
    Section(section::SectionCommands),

    /// Search stations and lines
    Search {
        /// Search query
        query: String,
    },

    /// Manage the SQLite cache
    #[command(subcommand)]
    Cache(cache_cmd::CacheCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    logging::init_logging(cli.verbose, config.effective_log_level());

    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, config.project.distance_unit.as_str());

    debug!(project = ?config.project_root, "subway starting");

    match cli.command {
        Commands::Init { path } => {
            debug!(%path, "Initializing project");
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized subway project at {}",
                project.root().display()
            ));
        }

        Commands::Station(cmd) => station::run(cmd, &output)?,
        Commands::Line(cmd) => line::run(cmd, &output)?,
        Commands::Section(cmd) => section::run(cmd, &output)?,
        Commands::Search { query } => search(&output, &query)?,
        Commands::Cache(cmd) => cache_cmd::run(cmd, &output)?,
    }

    debug!("Command completed successfully");
    Ok(())
}

/// Search stations and lines using the SQLite cache
fn search(output: &Output, query: &str) -> Result<()> {
    let project = Project::open_current()?;
    debug!(%query, "Searching");

    // Ensure cache is up to date
    let cache = project.get_or_rebuild_cache()?;

    let results = cache.search(query)?;
    debug!(count = results.len(), "Search finished");

    if output.is_json() {
        let items: Vec<_> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "name": r.name,
                    "color": r.detail,
                    "type": r.result_type.as_str(),
                })
            })
            .collect();
        output.data(&items);
    } else if results.is_empty() {
        println!("No results found for '{}'", query);
    } else {
        println!("Search results for '{}':", query);
        println!("{:<10} {:<10} NAME", "TYPE", "ID");
        println!("{}", "-".repeat(50));

        for result in &results {
            match &result.detail {
                Some(color) => println!(
                    "{:<10} {:<10} {} ({})",
                    result.result_type.as_str(),
                    result.id,
                    result.name,
                    color
                ),
                None => println!(
                    "{:<10} {:<10} {}",
                    result.result_type.as_str(),
                    result.id,
                    result.name
                ),
            }
        }

        println!();
        println!("Found {} result(s)", results.len());
    }

    Ok(())
}
