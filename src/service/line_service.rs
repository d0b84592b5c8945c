//! Line service
//!
//! Resolves station and line identities through the repository, hands
//! candidate sections to the line aggregate and persists whatever the
//! chain decided. Run it inside a repository transaction so a failed
//! persistence step discards the whole change.

use tracing::{info, warn};

use crate::domain::{Line, LineId, Section, SectionChange, SectionId, StationId};

use super::dto::{ChangeResponse, LineRequest, LineResponse, SectionRequest, SectionResponse};
use super::dto::StationResponse;
use super::error::ServiceError;
use super::repository::NetworkRepository;

pub struct LineService<'a, R: NetworkRepository> {
    repo: &'a mut R,
}

impl<'a, R: NetworkRepository> LineService<'a, R> {
    pub fn new(repo: &'a mut R) -> Self {
        Self { repo }
    }

    /// Creates a line and registers its first section
    pub fn save_line(&mut self, request: &LineRequest) -> Result<LineResponse, ServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::EmptyName);
        }

        let section = self.build_section(request.section_request())?;
        let mut line = self.repo.create_line(name, request.color.trim())?;
        info!(line = %line.id, name = %line.name, "Line created");

        self.register_section(&mut line, section)?;

        let line = self.repo.find_line(line.id)?;
        self.line_response(&line)
    }

    /// Adds a section to an existing line
    pub fn append_section(
        &mut self,
        line_id: LineId,
        request: SectionRequest,
    ) -> Result<ChangeResponse, ServiceError> {
        let mut line = self.repo.find_line(line_id)?;
        let section = self.build_section(request)?;

        let change = self.register_section(&mut line, section)?;
        self.change_response(&change)
    }

    /// Removes a station from a line, merging its neighbouring sections
    pub fn remove_station(
        &mut self,
        line_id: LineId,
        station_id: StationId,
    ) -> Result<ChangeResponse, ServiceError> {
        let mut line = self.repo.find_line(line_id)?;
        let station = self.repo.find_station(station_id)?;

        let change = line.remove_station(station.id).inspect_err(|e| {
            warn!(line = %line_id, station = %station_id, error = %e, "Station removal rejected");
        })?;
        let change = self.persist_change(change)?;
        info!(line = %line_id, station = %station_id, "Station removed from line");

        self.change_response(&change)
    }

    /// Replaces a line's name and color
    pub fn update_line(
        &mut self,
        line_id: LineId,
        name: &str,
        color: &str,
    ) -> Result<LineResponse, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::EmptyName);
        }

        let mut line = self.repo.find_line(line_id)?;
        line.update(name, color.trim());
        self.repo.save_line(&line)?;
        info!(line = %line_id, name = %line.name, color = %line.color, "Line updated");

        self.line_response(&line)
    }

    pub fn delete_line(&mut self, line_id: LineId) -> Result<(), ServiceError> {
        let line = self.repo.delete_line(line_id)?;
        info!(line = %line_id, name = %line.name, "Line deleted");
        Ok(())
    }

    pub fn find_line(&self, line_id: LineId) -> Result<LineResponse, ServiceError> {
        let line = self.repo.find_line(line_id)?;
        self.line_response(&line)
    }

    pub fn find_all_lines(&self) -> Result<Vec<LineResponse>, ServiceError> {
        self.repo
            .all_lines()?
            .iter()
            .map(|line| self.line_response(line))
            .collect()
    }

    pub fn find_section(&self, section_id: SectionId) -> Result<SectionResponse, ServiceError> {
        let section = self.repo.find_section(section_id)?;
        self.section_response(&section)
    }

    /// Lists sections, optionally only those of one line in path order
    pub fn find_all_sections(
        &self,
        line_id: Option<LineId>,
    ) -> Result<Vec<SectionResponse>, ServiceError> {
        match line_id {
            Some(line_id) => {
                let line = self.repo.find_line(line_id)?;
                line.sections()
                    .ordered_sections()
                    .into_iter()
                    .map(|s| self.section_response(s))
                    .collect()
            }
            None => self
                .repo
                .all_sections()
                .iter()
                .map(|s| self.section_response(s))
                .collect(),
        }
    }

    fn build_section(&self, request: SectionRequest) -> Result<Section, ServiceError> {
        let up = self.repo.find_station(request.up_station_id)?;
        let down = self.repo.find_station(request.down_station_id)?;
        Ok(Section::create(up.id, down.id, request.distance)?)
    }

    fn register_section(
        &mut self,
        line: &mut Line,
        section: Section,
    ) -> Result<SectionChange, ServiceError> {
        let (up, down, distance) = (
            section.up_station(),
            section.down_station(),
            section.distance(),
        );

        let change = line.add_section(section).inspect_err(|e| {
            warn!(line = %line.id, %up, %down, distance, error = %e, "Section rejected");
        })?;
        let change = self.persist_change(change)?;
        info!(line = %line.id, %up, %down, distance, "Section added");

        Ok(change)
    }

    /// Writes the chain's decision through the repository
    fn persist_change(&mut self, change: SectionChange) -> Result<SectionChange, ServiceError> {
        match change {
            SectionChange::Added { section, shrunk } => {
                let shrunk = shrunk
                    .map(|s| self.repo.persist_section(s))
                    .transpose()?;
                let section = self.repo.persist_section(section)?;
                Ok(SectionChange::Added { section, shrunk })
            }
            SectionChange::Removed { removed, merged } => {
                // A section without an ID was never stored
                if let Some(id) = removed.id() {
                    self.repo.delete_section(id)?;
                }
                let merged = merged
                    .map(|s| self.repo.persist_section(s))
                    .transpose()?;
                Ok(SectionChange::Removed { removed, merged })
            }
        }
    }

    fn section_response(&self, section: &Section) -> Result<SectionResponse, ServiceError> {
        let up = self.repo.find_station(section.up_station())?;
        let down = self.repo.find_station(section.down_station())?;
        Ok(SectionResponse::of(section, &up, &down))
    }

    fn change_response(&self, change: &SectionChange) -> Result<ChangeResponse, ServiceError> {
        Ok(match change {
            SectionChange::Added { section, shrunk } => ChangeResponse::Added {
                section: self.section_response(section)?,
                shrunk: shrunk
                    .as_ref()
                    .map(|s| self.section_response(s))
                    .transpose()?,
            },
            SectionChange::Removed { removed, merged } => ChangeResponse::Removed {
                removed: self.section_response(removed)?,
                merged: merged
                    .as_ref()
                    .map(|s| self.section_response(s))
                    .transpose()?,
            },
        })
    }

    fn line_response(&self, line: &Line) -> Result<LineResponse, ServiceError> {
        let stations = line
            .sections()
            .ordered_stations()
            .map(|id| self.repo.find_station(id).map(|s| StationResponse::of(&s)))
            .collect::<Result<Vec<_>, _>>()?;

        let sections = line
            .sections()
            .ordered_sections()
            .into_iter()
            .map(|s| self.section_response(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LineResponse {
            id: line.id,
            name: line.name.clone(),
            color: line.color.clone(),
            stations,
            sections,
            total_distance: line.sections().total_distance(),
            created_at: line.audit.created_at,
            modified_at: line.audit.modified_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChainError, InvalidSectionKind, Station};
    use crate::service::transaction;
    use crate::storage::Network;

    struct Fixture {
        network: Network,
        a: StationId,
        b: StationId,
        c: StationId,
        d: StationId,
    }

    fn fixture() -> Fixture {
        let mut network = Network::new();
        let a = network.create_station("Gangnam").unwrap().id;
        let b = network.create_station("Yeoksam").unwrap().id;
        let c = network.create_station("Seolleung").unwrap().id;
        let d = network.create_station("Samseong").unwrap().id;
        Fixture {
            network,
            a,
            b,
            c,
            d,
        }
    }

    fn line_request(up: StationId, down: StationId, distance: i64) -> LineRequest {
        LineRequest {
            name: "Line 2".to_string(),
            color: "green".to_string(),
            up_station_id: up,
            down_station_id: down,
            distance,
        }
    }

    fn request(up: StationId, down: StationId, distance: i64) -> SectionRequest {
        SectionRequest {
            up_station_id: up,
            down_station_id: down,
            distance,
        }
    }

    fn station_ids(line: &LineResponse) -> Vec<StationId> {
        line.stations.iter().map(|s| s.id).collect()
    }

    #[test]
    fn save_line_registers_first_section() {
        let mut f = fixture();
        let line = LineService::new(&mut f.network)
            .save_line(&line_request(f.a, f.b, 10))
            .unwrap();

        assert_eq!(station_ids(&line), vec![f.a, f.b]);
        assert_eq!(line.total_distance, 10);
        assert_eq!(line.sections.len(), 1);
        assert!(line.sections[0].id.is_some());
        assert_eq!(line.sections[0].line_id, Some(line.id));
    }

    #[test]
    fn save_line_rejects_duplicate_name() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        service.save_line(&line_request(f.a, f.b, 10)).unwrap();

        let err = service.save_line(&line_request(f.c, f.d, 5)).unwrap_err();
        assert_eq!(err, ServiceError::DuplicateLineName("Line 2".to_string()));
    }

    #[test]
    fn save_line_with_unknown_station_creates_nothing() {
        let mut f = fixture();
        let err = LineService::new(&mut f.network)
            .save_line(&line_request(f.a, StationId::new(99), 10))
            .unwrap_err();

        assert_eq!(err, ServiceError::StationNotFound(StationId::new(99)));
        assert!(f.network.all_lines().unwrap().is_empty());
    }

    #[test]
    fn append_section_splits_and_persists_both_sections() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.a, f.b, 10)).unwrap();

        let change = service.append_section(line.id, request(f.a, f.c, 4)).unwrap();

        match change {
            ChangeResponse::Added { section, shrunk } => {
                assert!(section.id.is_some());
                let shrunk = shrunk.unwrap();
                assert_eq!(shrunk.up_station.id, f.c);
                assert_eq!(shrunk.distance, 6);
            }
            other => panic!("unexpected change: {:?}", other),
        }

        let line = service.find_line(line.id).unwrap();
        assert_eq!(station_ids(&line), vec![f.a, f.c, f.b]);
        assert_eq!(line.total_distance, 10);
        assert_eq!(f.network.all_sections().len(), 2);
    }

    #[test]
    fn append_section_rejects_too_long_split() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.a, f.b, 10)).unwrap();

        let err = service
            .append_section(line.id, request(f.a, f.c, 10))
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Chain(ChainError::DistanceTooLong {
                distance: 10,
                existing: 10
            })
        );
        assert_eq!(f.network.all_sections().len(), 1);
    }

    #[test]
    fn append_section_to_missing_line_fails() {
        let mut f = fixture();
        let err = LineService::new(&mut f.network)
            .append_section(LineId::new(42), request(f.a, f.b, 3))
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn append_disconnected_section_fails() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.a, f.b, 10)).unwrap();

        let err = service
            .append_section(line.id, request(f.c, f.d, 3))
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Chain(ChainError::InvalidSection(
                InvalidSectionKind::StationsNotConnected
            ))
        );
    }

    #[test]
    fn remove_station_merges_and_deletes() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.a, f.b, 4)).unwrap();
        service.append_section(line.id, request(f.b, f.c, 6)).unwrap();

        let change = service.remove_station(line.id, f.b).unwrap();
        assert!(matches!(
            change,
            ChangeResponse::Removed {
                merged: Some(_),
                ..
            }
        ));

        let line = service.find_line(line.id).unwrap();
        assert_eq!(station_ids(&line), vec![f.a, f.c]);
        assert_eq!(line.sections[0].distance, 10);
        assert_eq!(f.network.all_sections().len(), 1);
    }

    #[test]
    fn remove_from_single_section_line_fails() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.a, f.b, 4)).unwrap();

        for station in [f.a, f.b] {
            let err = service.remove_station(line.id, station).unwrap_err();
            assert_eq!(err, ServiceError::Chain(ChainError::CannotRemove(1)));
        }
    }

    #[test]
    fn update_line_replaces_fields_and_keeps_chain() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.a, f.b, 4)).unwrap();

        let updated = service.update_line(line.id, "Line 9", "gold").unwrap();

        assert_eq!(updated.name, "Line 9");
        assert_eq!(updated.color, "gold");
        assert_eq!(station_ids(&updated), vec![f.a, f.b]);
    }

    #[test]
    fn delete_line_removes_its_sections() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.a, f.b, 4)).unwrap();

        service.delete_line(line.id).unwrap();

        assert!(f.network.all_sections().is_empty());
        assert!(f.network.find_line(line.id).is_err());
    }

    #[test]
    fn find_all_sections_for_line_is_in_path_order() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.b, f.c, 4)).unwrap();
        service.append_section(line.id, request(f.c, f.d, 2)).unwrap();
        service.append_section(line.id, request(f.a, f.b, 3)).unwrap();

        let sections = service.find_all_sections(Some(line.id)).unwrap();
        let ups: Vec<_> = sections.iter().map(|s| s.up_station.id).collect();

        assert_eq!(ups, vec![f.a, f.b, f.c]);
    }

    /// Repository double that fails once its write budget is spent
    #[derive(Clone)]
    struct FlakyStorage {
        network: Network,
        writes_left: usize,
    }

    impl FlakyStorage {
        fn spend_write(&mut self) -> Result<(), ServiceError> {
            if self.writes_left == 0 {
                return Err(ServiceError::Storage("disk full".to_string()));
            }
            self.writes_left -= 1;
            Ok(())
        }
    }

    impl NetworkRepository for FlakyStorage {
        fn create_station(&mut self, name: &str) -> Result<Station, ServiceError> {
            self.network.create_station(name)
        }
        fn find_station(&self, id: StationId) -> Result<Station, ServiceError> {
            self.network.find_station(id)
        }
        fn all_stations(&self) -> Vec<Station> {
            self.network.all_stations()
        }
        fn delete_station(&mut self, id: StationId) -> Result<Station, ServiceError> {
            self.network.delete_station(id)
        }
        fn create_line(&mut self, name: &str, color: &str) -> Result<Line, ServiceError> {
            self.network.create_line(name, color)
        }
        fn find_line(&self, id: LineId) -> Result<Line, ServiceError> {
            self.network.find_line(id)
        }
        fn all_lines(&self) -> Result<Vec<Line>, ServiceError> {
            self.network.all_lines()
        }
        fn save_line(&mut self, line: &Line) -> Result<(), ServiceError> {
            self.network.save_line(line)
        }
        fn delete_line(&mut self, id: LineId) -> Result<Line, ServiceError> {
            self.network.delete_line(id)
        }
        fn find_section(&self, id: SectionId) -> Result<Section, ServiceError> {
            self.network.find_section(id)
        }
        fn all_sections(&self) -> Vec<Section> {
            self.network.all_sections()
        }
        fn persist_section(&mut self, section: Section) -> Result<Section, ServiceError> {
            self.spend_write()?;
            self.network.persist_section(section)
        }
        fn delete_section(&mut self, id: SectionId) -> Result<(), ServiceError> {
            self.spend_write()?;
            self.network.delete_section(id)
        }
    }

    #[test]
    fn failed_persistence_rolls_back_split() {
        let mut f = fixture();
        let line = LineService::new(&mut f.network)
            .save_line(&line_request(f.a, f.b, 10))
            .unwrap();

        // The shrunk host is written, then the new section fails
        let mut repo = FlakyStorage {
            network: f.network.clone(),
            writes_left: 1,
        };
        let err = transaction(&mut repo, |repo| {
            LineService::new(repo).append_section(line.id, request(f.a, f.c, 4))
        })
        .unwrap_err();

        assert_eq!(err, ServiceError::Storage("disk full".to_string()));
        assert_eq!(repo.network, f.network);
        assert_eq!(repo.writes_left, 1);

        let line = LineService::new(&mut repo).find_line(line.id).unwrap();
        assert_eq!(station_ids(&line), vec![f.a, f.b]);
        assert_eq!(line.total_distance, 10);
    }

    #[test]
    fn failed_delete_leaves_merge_unapplied() {
        let mut f = fixture();
        let mut service = LineService::new(&mut f.network);
        let line = service.save_line(&line_request(f.a, f.b, 4)).unwrap();
        service.append_section(line.id, request(f.b, f.c, 6)).unwrap();

        let mut repo = FlakyStorage {
            network: f.network.clone(),
            writes_left: 0,
        };
        let err = transaction(&mut repo, |repo| {
            LineService::new(repo).remove_station(line.id, f.b)
        })
        .unwrap_err();

        assert_eq!(err, ServiceError::Storage("disk full".to_string()));
        assert_eq!(repo.network, f.network);
    }

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn rejected_chain_operations_log_warnings() {
        let mut f = fixture();
        let line_id = LineService::new(&mut f.network)
            .save_line(&line_request(f.a, f.b, 10))
            .unwrap()
            .id;

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut service = LineService::new(&mut f.network);
            assert!(service
                .append_section(line_id, request(f.c, f.d, 3))
                .is_err());
            assert!(service.remove_station(line_id, f.a).is_err());
        });

        let text = logs.text();
        assert!(text.contains("WARN"));
        assert!(text.contains("Section rejected"));
        assert!(text.contains("Station removal rejected"));
    }
}
