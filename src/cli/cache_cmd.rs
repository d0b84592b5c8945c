//! Cache CLI commands

use anyhow::Result;
use clap::Subcommand;
use tracing::debug;

use super::output::Output;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Rebuild the cache from network.jsonl
    Rebuild,

    /// Show cache status
    Status,
}

pub fn run(cmd: CacheCommands, output: &Output) -> Result<()> {
    match cmd {
        CacheCommands::Rebuild => rebuild(output),
        CacheCommands::Status => status(output),
    }
}

fn rebuild(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    debug!("Rebuilding cache from network store");

    let start = std::time::Instant::now();
    let cache = project.rebuild_cache()?;
    let duration = start.elapsed();

    let (stations, lines, sections) = cache.counts()?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "rebuilt": true,
            "duration_ms": duration.as_millis(),
            "stations": stations,
            "lines": lines,
            "sections": sections,
        }));
    } else {
        output.success(&format!(
            "Cache rebuilt in {:?} ({} stations, {} lines, {} sections)",
            duration, stations, lines, sections
        ));
    }

    Ok(())
}

fn status(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let cache = project.cache()?;

    let is_stale = cache.is_stale()?;
    let cache_path = cache.path().to_path_buf();
    let (stations, lines, sections) = cache.counts()?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": cache_path.display().to_string(),
            "stale": is_stale,
            "stations": stations,
            "lines": lines,
            "sections": sections,
        }));
    } else {
        println!("Cache Status");
        println!("{}", "=".repeat(40));
        println!("Path: {}", cache_path.display());
        println!(
            "Status: {}",
            if is_stale {
                "STALE (needs rebuild)"
            } else {
                "fresh"
            }
        );
        println!();
        println!("Cached Data:");
        println!("  Stations: {}", stations);
        println!("  Lines: {}", lines);
        println!("  Sections: {}", sections);

        if is_stale {
            println!();
            println!("Run 'subway cache rebuild' to update the cache.");
        }
    }

    Ok(())
}
