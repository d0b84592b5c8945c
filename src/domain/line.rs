//! Line domain model
//!
//! A line is the aggregate root of its section chain. Callers never touch
//! the chain directly: sections go in through [`Line::add_section`] and
//! stations come out through [`Line::remove_station`].

use serde::{Deserialize, Serialize};

use super::audit::Audit;
use super::chain::{SectionChange, Sections};
use super::error::ChainError;
use super::id::{LineId, StationId};
use super::section::Section;

/// A rail line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub color: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(skip)]
    sections: Sections,
}

impl Line {
    /// Creates a line with an empty chain
    pub fn new(id: LineId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            audit: Audit::now(),
            sections: Sections::new(),
        }
    }

    /// Attaches a chain assembled from storage
    pub fn with_sections(mut self, sections: Sections) -> Self {
        self.sections = sections;
        self
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Stations in path order
    pub fn stations(&self) -> Vec<StationId> {
        self.sections.ordered_stations().collect()
    }

    /// Registers the section to this line and adds it to the chain
    pub fn add_section(&mut self, mut section: Section) -> Result<SectionChange, ChainError> {
        section.register_line(self.id)?;
        self.sections.add(section)
    }

    /// Removes a station from the chain, merging or trimming sections
    pub fn remove_station(&mut self, station: StationId) -> Result<SectionChange, ChainError> {
        self.sections.remove(station)
    }

    /// Replaces name and color
    pub fn update(&mut self, name: impl Into<String>, color: impl Into<String>) {
        self.name = name.into();
        self.color = color.into();
        self.audit.touch();
    }
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(n: u64) -> StationId {
        StationId::new(n)
    }

    #[test]
    fn add_section_registers_line() {
        let mut line = Line::new(LineId::new(1), "Line 2", "green");
        let change = line
            .add_section(Section::create(st(1), st(2), 10).unwrap())
            .unwrap();

        match change {
            SectionChange::Added { section, .. } => {
                assert_eq!(section.line(), Some(LineId::new(1)));
            }
            other => panic!("unexpected change: {:?}", other),
        }
        assert_eq!(line.stations(), vec![st(1), st(2)]);
    }

    #[test]
    fn add_section_rejects_section_of_other_line() {
        let mut line = Line::new(LineId::new(1), "Line 2", "green");
        let mut section = Section::create(st(1), st(2), 10).unwrap();
        section.register_line(LineId::new(9)).unwrap();

        let err = line.add_section(section).unwrap_err();

        assert!(matches!(err, ChainError::AlreadyRegistered { .. }));
        assert!(line.sections().is_empty());
    }

    #[test]
    fn remove_station_delegates_to_chain() {
        let mut line = Line::new(LineId::new(1), "Line 2", "green");
        line.add_section(Section::create(st(1), st(2), 4).unwrap())
            .unwrap();
        line.add_section(Section::create(st(2), st(3), 6).unwrap())
            .unwrap();

        line.remove_station(st(2)).unwrap();

        assert_eq!(line.stations(), vec![st(1), st(3)]);
        assert_eq!(line.sections().total_distance(), 10);
    }

    #[test]
    fn update_replaces_name_and_color() {
        let mut line = Line::new(LineId::new(1), "Line 2", "green");
        line.add_section(Section::create(st(1), st(2), 4).unwrap())
            .unwrap();

        line.update("Line 9", "gold");

        assert_eq!(line.name, "Line 9");
        assert_eq!(line.color, "gold");
        assert_eq!(line.sections().len(), 1);
    }
}
