//! Line CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{LineId, StationId};
use crate::service::{LineRequest, LineResponse, LineService, NetworkRepository};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum LineCommands {
    /// Create a line with its first section
    ///
    /// Example:
    ///   subway line create "Line 2" green --up st-1 --down st-2 --distance 10
    Create {
        /// Line name (must be unique)
        name: String,

        /// Line color
        color: String,

        /// Up-end station of the first section
        #[arg(long)]
        up: StationId,

        /// Down-end station of the first section
        #[arg(long)]
        down: StationId,

        /// Length of the first section
        #[arg(long, short, allow_negative_numbers = true)]
        distance: i64,
    },

    /// List all lines
    List,

    /// Show a line's stations in order
    Show {
        /// Line ID (e.g. ln-1)
        id: LineId,
    },

    /// Rename or recolor a line
    Update {
        /// Line ID
        id: LineId,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New color
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a line and its sections
    Delete {
        /// Line ID
        id: LineId,
    },
}

pub fn run(cmd: LineCommands, output: &Output) -> Result<()> {
    match cmd {
        LineCommands::Create {
            name,
            color,
            up,
            down,
            distance,
        } => {
            let request = LineRequest {
                name,
                color,
                up_station_id: up,
                down_station_id: down,
                distance,
            };
            create_line(output, &request)
        }
        LineCommands::List => list_lines(output),
        LineCommands::Show { id } => show_line(output, id),
        LineCommands::Update { id, name, color } => {
            update_line(output, id, name.as_deref(), color.as_deref())
        }
        LineCommands::Delete { id } => delete_line(output, id),
    }
}

fn create_line(output: &Output, request: &LineRequest) -> Result<()> {
    let project = Project::open_current()?;

    let line = project
        .store()
        .transaction(|network| Ok(LineService::new(network).save_line(request)?))?;

    if output.is_json() {
        output.data(&line);
    } else {
        output.success(&format!("Created line: {} - {}", line.id, line.name));
        print_route(output, &line);
    }

    Ok(())
}

fn list_lines(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut network = project.store().load()?;
    let lines = LineService::new(&mut network).find_all_lines()?;

    if output.is_json() {
        output.data(&lines);
        return Ok(());
    }

    if lines.is_empty() {
        println!("No lines found. Create one with: subway line create");
        return Ok(());
    }

    println!("{:<8} {:<20} {:<10} {:>8} LENGTH", "ID", "NAME", "COLOR", "STATIONS");
    println!("{}", "-".repeat(64));
    for line in &lines {
        println!(
            "{:<8} {:<20} {:<10} {:>8} {}",
            line.id.to_string(),
            line.name,
            line.color,
            line.stations.len(),
            output.distance(line.total_distance)
        );
    }

    Ok(())
}

fn show_line(output: &Output, id: LineId) -> Result<()> {
    let project = Project::open_current()?;
    let mut network = project.store().load()?;
    let line = LineService::new(&mut network).find_line(id)?;

    if output.is_json() {
        output.data(&line);
        return Ok(());
    }

    println!("Line: {}", line.id);
    println!("Name: {}", line.name);
    println!("Color: {}", line.color);
    println!("Length: {}", output.distance(line.total_distance));
    println!();
    print_route(output, &line);

    Ok(())
}

fn update_line(
    output: &Output,
    id: LineId,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<()> {
    if name.is_none() && color.is_none() {
        anyhow::bail!("Nothing to update. Pass --name and/or --color.");
    }

    let project = Project::open_current()?;

    let line = project.store().transaction(|network| {
        let current = network.find_line(id)?;
        let name = name.unwrap_or(&current.name);
        let color = color.unwrap_or(&current.color);
        Ok(LineService::new(network).update_line(id, name, color)?)
    })?;

    if output.is_json() {
        output.data(&line);
    } else {
        output.success(&format!(
            "Updated line: {} - {} ({})",
            line.id, line.name, line.color
        ));
    }

    Ok(())
}

fn delete_line(output: &Output, id: LineId) -> Result<()> {
    let project = Project::open_current()?;

    project
        .store()
        .transaction(|network| Ok(LineService::new(network).delete_line(id)?))?;

    if output.is_json() {
        output.data(&serde_json::json!({ "deleted": id }));
    } else {
        output.success(&format!("Deleted line: {}", id));
    }

    Ok(())
}

/// Prints stations in path order with the distance to the next one
fn print_route(output: &Output, line: &LineResponse) {
    for (i, station) in line.stations.iter().enumerate() {
        let id = station.id.to_string();
        match line.sections.get(i) {
            Some(section) => {
                let distance = output.distance(section.distance);
                output.row(&[&id, &station.name, &format!("↓ {}", distance)]);
            }
            None => output.row(&[&id, &station.name]),
        }
    }
}
