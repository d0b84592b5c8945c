//! Station CLI commands

use anyhow::Result;
use clap::Subcommand;
use tracing::debug;

use super::output::Output;
use crate::domain::StationId;
use crate::service::{NetworkRepository, StationResponse};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum StationCommands {
    /// Add a station
    Add {
        /// Station name
        name: String,
    },

    /// List all stations
    List,

    /// Show a station and the lines serving it
    Show {
        /// Station ID (e.g. st-3)
        id: StationId,
    },

    /// Remove a station that no section uses
    Remove {
        /// Station ID
        id: StationId,
    },
}

pub fn run(cmd: StationCommands, output: &Output) -> Result<()> {
    match cmd {
        StationCommands::Add { name } => add_station(output, &name),
        StationCommands::List => list_stations(output),
        StationCommands::Show { id } => show_station(output, id),
        StationCommands::Remove { id } => remove_station(output, id),
    }
}

fn add_station(output: &Output, name: &str) -> Result<()> {
    let project = Project::open_current()?;

    let station = project
        .store()
        .transaction(|network| Ok(network.create_station(name)?))?;

    if output.is_json() {
        output.data(&StationResponse::of(&station));
    } else {
        output.success(&format!("Created station: {} - {}", station.id, station.name));
    }

    Ok(())
}

fn list_stations(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let stations = project.store().load()?.all_stations();
    debug!(count = stations.len(), "Listing stations");

    if output.is_json() {
        let items: Vec<_> = stations.iter().map(StationResponse::of).collect();
        output.data(&items);
        return Ok(());
    }

    if stations.is_empty() {
        println!("No stations found. Add one with: subway station add <name>");
        return Ok(());
    }

    println!("{:<10} NAME", "ID");
    println!("{}", "-".repeat(40));
    for station in &stations {
        println!("{:<10} {}", station.id.to_string(), station.name);
    }

    Ok(())
}

fn show_station(output: &Output, id: StationId) -> Result<()> {
    let project = Project::open_current()?;
    let station = project.store().load()?.find_station(id)?;

    let cache = project.get_or_rebuild_cache()?;
    let lines = cache.lines_serving(&id.to_string())?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "station": StationResponse::of(&station),
            "lines": lines,
        }));
        return Ok(());
    }

    println!("Station: {}", station.id);
    println!("Name: {}", station.name);
    println!("Created: {}", station.audit.created_at.format("%Y-%m-%d %H:%M"));
    if lines.is_empty() {
        println!("Lines: (none)");
    } else {
        println!("Lines: {}", lines.join(", "));
    }

    Ok(())
}

fn remove_station(output: &Output, id: StationId) -> Result<()> {
    let project = Project::open_current()?;

    let station = project
        .store()
        .transaction(|network| Ok(network.delete_station(id)?))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "removed": station.id,
            "name": station.name,
        }));
    } else {
        output.success(&format!("Removed station: {} - {}", station.id, station.name));
    }

    Ok(())
}
