//! In-memory network registry
//!
//! Holds every station, line and section of a project and implements the
//! repository contract over them. Lines are stored without their chain;
//! `find_line` assembles the chain from the line's section rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Line, LineId, Section, SectionId, Sections, Station, StationId};
use crate::service::{NetworkRepository, ServiceError};

/// One row of the persisted network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Station(Station),
    Line(Line),
    Section(Section),
}

/// All stations, lines and sections of a project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    stations: BTreeMap<StationId, Station>,
    lines: BTreeMap<LineId, Line>,
    sections: BTreeMap<SectionId, Section>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a network from stored records
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Result<Self, ServiceError> {
        let mut network = Self::new();

        for record in records {
            match record {
                Record::Station(station) => {
                    network.stations.insert(station.id, station);
                }
                Record::Line(line) => {
                    network.lines.insert(line.id, line);
                }
                Record::Section(section) => {
                    let id = section.id().ok_or_else(|| {
                        ServiceError::Storage("stored section has no ID".to_string())
                    })?;
                    network.sections.insert(id, section);
                }
            }
        }

        Ok(network)
    }

    /// Records in a stable order: stations, lines, then sections, each by ID
    pub fn records(&self) -> Vec<Record> {
        let stations = self.stations.values().cloned().map(Record::Station);
        let lines = self.lines.values().cloned().map(Record::Line);
        let sections = self.sections.values().cloned().map(Record::Section);

        stations.chain(lines).chain(sections).collect()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn next_station_id(&self) -> Result<StationId, ServiceError> {
        match self.stations.keys().next_back() {
            Some(last) => last.next().ok_or_else(|| exhausted("station")),
            None => Ok(StationId::new(1)),
        }
    }

    fn next_line_id(&self) -> Result<LineId, ServiceError> {
        match self.lines.keys().next_back() {
            Some(last) => last.next().ok_or_else(|| exhausted("line")),
            None => Ok(LineId::new(1)),
        }
    }

    fn next_section_id(&self) -> Result<SectionId, ServiceError> {
        match self.sections.keys().next_back() {
            Some(last) => last.next().ok_or_else(|| exhausted("section")),
            None => Ok(SectionId::new(1)),
        }
    }

    fn ensure_unique_name(&self, name: &str, except: Option<LineId>) -> Result<(), ServiceError> {
        let taken = self
            .lines
            .values()
            .any(|line| line.name == name && Some(line.id) != except);

        if taken {
            return Err(ServiceError::DuplicateLineName(name.to_string()));
        }
        Ok(())
    }

    fn sections_of(&self, line: LineId) -> Vec<Section> {
        self.sections
            .values()
            .filter(|s| s.line() == Some(line))
            .cloned()
            .collect()
    }
}

fn exhausted(kind: &str) -> ServiceError {
    ServiceError::Storage(format!("no {} IDs left to allocate", kind))
}

impl NetworkRepository for Network {
    fn create_station(&mut self, name: &str) -> Result<Station, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::EmptyName);
        }

        let station = Station::new(self.next_station_id()?, name);
        self.stations.insert(station.id, station.clone());
        debug!(station = %station.id, name = %station.name, "Station stored");
        Ok(station)
    }

    fn find_station(&self, id: StationId) -> Result<Station, ServiceError> {
        self.stations
            .get(&id)
            .cloned()
            .ok_or(ServiceError::StationNotFound(id))
    }

    fn all_stations(&self) -> Vec<Station> {
        self.stations.values().cloned().collect()
    }

    fn delete_station(&mut self, id: StationId) -> Result<Station, ServiceError> {
        if !self.stations.contains_key(&id) {
            return Err(ServiceError::StationNotFound(id));
        }
        if self.sections.values().any(|s| s.touches(id)) {
            return Err(ServiceError::StationInUse(id));
        }

        self.stations
            .remove(&id)
            .ok_or(ServiceError::StationNotFound(id))
    }

    fn create_line(&mut self, name: &str, color: &str) -> Result<Line, ServiceError> {
        self.ensure_unique_name(name, None)?;

        let line = Line::new(self.next_line_id()?, name, color);
        self.lines.insert(line.id, line.clone());
        debug!(line = %line.id, name = %line.name, "Line stored");
        Ok(line)
    }

    fn find_line(&self, id: LineId) -> Result<Line, ServiceError> {
        let line = self
            .lines
            .get(&id)
            .cloned()
            .ok_or(ServiceError::LineNotFound(id))?;

        let sections = Sections::from_sections(self.sections_of(id))?;
        Ok(line.with_sections(sections))
    }

    fn all_lines(&self) -> Result<Vec<Line>, ServiceError> {
        self.lines.keys().map(|id| self.find_line(*id)).collect()
    }

    fn save_line(&mut self, line: &Line) -> Result<(), ServiceError> {
        if !self.lines.contains_key(&line.id) {
            return Err(ServiceError::LineNotFound(line.id));
        }
        self.ensure_unique_name(&line.name, Some(line.id))?;

        self.lines
            .insert(line.id, line.clone().with_sections(Sections::new()));
        Ok(())
    }

    fn delete_line(&mut self, id: LineId) -> Result<Line, ServiceError> {
        let line = self.lines.remove(&id).ok_or(ServiceError::LineNotFound(id))?;
        self.sections.retain(|_, s| s.line() != Some(id));
        Ok(line)
    }

    fn find_section(&self, id: SectionId) -> Result<Section, ServiceError> {
        self.sections
            .get(&id)
            .cloned()
            .ok_or(ServiceError::SectionNotFound(id))
    }

    fn all_sections(&self) -> Vec<Section> {
        self.sections.values().cloned().collect()
    }

    fn persist_section(&mut self, mut section: Section) -> Result<Section, ServiceError> {
        let id = match section.id() {
            Some(id) => id,
            None => {
                let id = self.next_section_id()?;
                section.assign_id(id);
                id
            }
        };

        self.sections.insert(id, section.clone());
        debug!(section = %id, "Section stored");
        Ok(section)
    }

    fn delete_section(&mut self, id: SectionId) -> Result<(), ServiceError> {
        self.sections
            .remove(&id)
            .map(|_| ())
            .ok_or(ServiceError::SectionNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChainError;

    fn network_with_line() -> (Network, LineId) {
        let mut network = Network::new();
        let a = network.create_station("Jamsil").unwrap().id;
        let b = network.create_station("Sincheon").unwrap().id;
        let line = network.create_line("Line 2", "green").unwrap();

        let mut section = Section::create(a, b, 5).unwrap();
        section.register_line(line.id).unwrap();
        network.persist_section(section).unwrap();

        (network, line.id)
    }

    #[test]
    fn ids_are_sequential() {
        let mut network = Network::new();
        let first = network.create_station("A").unwrap();
        let second = network.create_station("B").unwrap();

        assert_eq!(first.id, StationId::new(1));
        assert_eq!(second.id, StationId::new(2));
    }

    #[test]
    fn exhausted_ids_are_a_storage_error() {
        let records = vec![Record::Station(Station::new(StationId::new(u64::MAX), "Edge"))];
        let mut network = Network::from_records(records).unwrap();

        assert!(matches!(
            network.create_station("Next"),
            Err(ServiceError::Storage(_))
        ));
        assert_eq!(network.station_count(), 1);
    }

    #[test]
    fn create_station_rejects_blank_name() {
        let mut network = Network::new();
        assert_eq!(network.create_station("  ").unwrap_err(), ServiceError::EmptyName);
    }

    #[test]
    fn find_line_assembles_chain() {
        let (network, line_id) = network_with_line();
        let line = network.find_line(line_id).unwrap();

        assert_eq!(line.sections().len(), 1);
        assert_eq!(line.stations(), vec![StationId::new(1), StationId::new(2)]);
    }

    #[test]
    fn missing_lookups_report_not_found() {
        let network = Network::new();

        assert_eq!(
            network.find_station(StationId::new(1)).unwrap_err(),
            ServiceError::StationNotFound(StationId::new(1))
        );
        assert_eq!(
            network.find_line(LineId::new(1)).unwrap_err(),
            ServiceError::LineNotFound(LineId::new(1))
        );
        assert_eq!(
            network.find_section(SectionId::new(1)).unwrap_err(),
            ServiceError::SectionNotFound(SectionId::new(1))
        );
    }

    #[test]
    fn line_names_are_unique() {
        let (mut network, _) = network_with_line();

        assert_eq!(
            network.create_line("Line 2", "blue").unwrap_err(),
            ServiceError::DuplicateLineName("Line 2".to_string())
        );
    }

    #[test]
    fn save_line_checks_name_against_other_lines() {
        let (mut network, line_id) = network_with_line();
        let other = network.create_line("Line 8", "pink").unwrap();

        let mut renamed = network.find_line(other.id).unwrap();
        renamed.update("Line 2", "pink");
        assert!(network.save_line(&renamed).is_err());

        // Keeping its own name is fine
        let mut same = network.find_line(line_id).unwrap();
        same.update("Line 2", "lime");
        network.save_line(&same).unwrap();
        assert_eq!(network.find_line(line_id).unwrap().color, "lime");
    }

    #[test]
    fn station_in_use_cannot_be_deleted() {
        let (mut network, _) = network_with_line();

        assert_eq!(
            network.delete_station(StationId::new(1)).unwrap_err(),
            ServiceError::StationInUse(StationId::new(1))
        );

        let lonely = network.create_station("Lonely").unwrap();
        network.delete_station(lonely.id).unwrap();
        assert_eq!(network.station_count(), 2);
    }

    #[test]
    fn corrupt_rows_are_reported() {
        let (mut network, line_id) = network_with_line();

        // A branching section written behind the chain's back
        let mut branch = Section::create(StationId::new(1), StationId::new(3), 2).unwrap();
        branch.register_line(line_id).unwrap();
        network.persist_section(branch).unwrap();

        assert!(matches!(
            network.find_line(line_id),
            Err(ServiceError::Chain(ChainError::CorruptChain(_)))
        ));
    }

    #[test]
    fn records_roundtrip() {
        let (network, _) = network_with_line();

        let json: Vec<String> = network
            .records()
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        assert!(json[0].contains("\"kind\":\"station\""));

        let records = json
            .iter()
            .map(|line| serde_json::from_str::<Record>(line).unwrap());
        let restored = Network::from_records(records).unwrap();

        assert_eq!(restored, network);
    }
}
