//! Repository contract consumed by the line service
//!
//! Lookups fail with the matching `*NotFound` error. Persistence calls are
//! made only after the chain has accepted a change.

use crate::domain::{Line, LineId, Section, SectionId, Station, StationId};

use super::error::ServiceError;

pub trait NetworkRepository {
    /// Stores a new station with the next free ID
    fn create_station(&mut self, name: &str) -> Result<Station, ServiceError>;

    fn find_station(&self, id: StationId) -> Result<Station, ServiceError>;

    fn all_stations(&self) -> Vec<Station>;

    /// Deletes a station that no section references
    fn delete_station(&mut self, id: StationId) -> Result<Station, ServiceError>;

    /// Stores a new line with an empty chain; names are unique
    fn create_line(&mut self, name: &str, color: &str) -> Result<Line, ServiceError>;

    /// Loads a line together with its section chain
    fn find_line(&self, id: LineId) -> Result<Line, ServiceError>;

    fn all_lines(&self) -> Result<Vec<Line>, ServiceError>;

    /// Writes back a line's name, color and audit record
    fn save_line(&mut self, line: &Line) -> Result<(), ServiceError>;

    /// Deletes a line and all of its sections
    fn delete_line(&mut self, id: LineId) -> Result<Line, ServiceError>;

    fn find_section(&self, id: SectionId) -> Result<Section, ServiceError>;

    fn all_sections(&self) -> Vec<Section>;

    /// Inserts or updates a section, assigning an ID on first persist
    fn persist_section(&mut self, section: Section) -> Result<Section, ServiceError>;

    fn delete_section(&mut self, id: SectionId) -> Result<(), ServiceError>;
}
