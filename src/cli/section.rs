//! Section CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{LineId, SectionId, StationId};
use crate::service::{ChangeResponse, LineService, SectionRequest, SectionResponse};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum SectionCommands {
    /// Add a section to a line
    ///
    /// The section must extend either end of the line or split an existing
    /// section that shares its up or down station.
    ///
    /// Example:
    ///   subway section add ln-1 --up st-2 --down st-5 --distance 4
    Add {
        /// Line ID
        line: LineId,

        /// Up station
        #[arg(long)]
        up: StationId,

        /// Down station
        #[arg(long)]
        down: StationId,

        /// Section length
        #[arg(long, short, allow_negative_numbers = true)]
        distance: i64,
    },

    /// Remove a station from a line, merging the sections around it
    Remove {
        /// Line ID
        line: LineId,

        /// Station to remove
        station: StationId,
    },

    /// List sections (all, or one line's in path order)
    List {
        /// Only sections of this line
        #[arg(long)]
        line: Option<LineId>,
    },

    /// Show section details
    Show {
        /// Section ID (e.g. sec-4)
        id: SectionId,
    },
}

pub fn run(cmd: SectionCommands, output: &Output) -> Result<()> {
    match cmd {
        SectionCommands::Add {
            line,
            up,
            down,
            distance,
        } => {
            let request = SectionRequest {
                up_station_id: up,
                down_station_id: down,
                distance,
            };
            add_section(output, line, request)
        }
        SectionCommands::Remove { line, station } => remove_station(output, line, station),
        SectionCommands::List { line } => list_sections(output, line),
        SectionCommands::Show { id } => show_section(output, id),
    }
}

fn add_section(output: &Output, line: LineId, request: SectionRequest) -> Result<()> {
    let project = Project::open_current()?;

    let change = project
        .store()
        .transaction(|network| Ok(LineService::new(network).append_section(line, request)?))?;

    print_change(output, &change);
    Ok(())
}

fn remove_station(output: &Output, line: LineId, station: StationId) -> Result<()> {
    let project = Project::open_current()?;

    let change = project
        .store()
        .transaction(|network| Ok(LineService::new(network).remove_station(line, station)?))?;

    print_change(output, &change);
    Ok(())
}

fn list_sections(output: &Output, line: Option<LineId>) -> Result<()> {
    let project = Project::open_current()?;
    let mut network = project.store().load()?;
    let sections = LineService::new(&mut network).find_all_sections(line)?;

    if output.is_json() {
        output.data(&sections);
        return Ok(());
    }

    if sections.is_empty() {
        println!("No sections found.");
        return Ok(());
    }

    println!("{:<8} {:<8} {:<20} {:<20} DISTANCE", "ID", "LINE", "UP", "DOWN");
    println!("{}", "-".repeat(72));
    for section in &sections {
        println!(
            "{:<8} {:<8} {:<20} {:<20} {}",
            label(section.id),
            label(section.line_id),
            section.up_station.name,
            section.down_station.name,
            output.distance(section.distance)
        );
    }

    Ok(())
}

fn show_section(output: &Output, id: SectionId) -> Result<()> {
    let project = Project::open_current()?;
    let mut network = project.store().load()?;
    let section = LineService::new(&mut network).find_section(id)?;

    if output.is_json() {
        output.data(&section);
        return Ok(());
    }

    println!("Section: {}", label(section.id));
    println!("Line: {}", label(section.line_id));
    println!(
        "Up: {} ({})",
        section.up_station.id, section.up_station.name
    );
    println!(
        "Down: {} ({})",
        section.down_station.id, section.down_station.name
    );
    println!("Distance: {}", output.distance(section.distance));

    Ok(())
}

fn print_change(output: &Output, change: &ChangeResponse) {
    if output.is_json() {
        output.data(change);
        return;
    }

    match change {
        ChangeResponse::Added { section, shrunk } => {
            output.success(&format!("Added section: {}", describe(output, section)));
            if let Some(shrunk) = shrunk {
                println!("  Shortened: {}", describe(output, shrunk));
            }
        }
        ChangeResponse::Removed { removed, merged } => {
            output.success(&format!("Removed section: {}", describe(output, removed)));
            if let Some(merged) = merged {
                println!("  Merged into: {}", describe(output, merged));
            }
        }
    }
}

fn describe(output: &Output, section: &SectionResponse) -> String {
    format!(
        "{} {} -> {} ({})",
        label(section.id),
        section.up_station.name,
        section.down_station.name,
        output.distance(section.distance)
    )
}

fn label(id: Option<impl std::fmt::Display>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}
