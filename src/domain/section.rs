//! Section domain model
//!
//! A section is one directed, distance-weighted edge between two stations.
//! It belongs to exactly one line, bound once through [`Section::register_line`].

use serde::{Deserialize, Serialize};

use super::audit::Audit;
use super::error::{ChainError, InvalidSectionKind};
use super::id::{LineId, SectionId, StationId};

/// One edge of a line's path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Assigned by the repository on first persist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<SectionId>,
    up_station: StationId,
    down_station: StationId,
    distance: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<LineId>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Section {
    /// Creates a candidate section
    ///
    /// Fails when both ends are the same station or the distance is not
    /// a positive value that fits in `u32`.
    pub fn create(
        up_station: StationId,
        down_station: StationId,
        distance: i64,
    ) -> Result<Self, ChainError> {
        if up_station == down_station {
            return Err(InvalidSectionKind::SameStations.into());
        }
        if distance <= 0 {
            return Err(InvalidSectionKind::NonPositiveDistance.into());
        }
        let distance =
            u32::try_from(distance).map_err(|_| InvalidSectionKind::DistanceOutOfRange)?;

        Ok(Self {
            id: None,
            up_station,
            down_station,
            distance,
            line: None,
            audit: Audit::now(),
        })
    }

    /// Binds the section to a line
    ///
    /// Re-registering with the same line is a no-op.
    pub fn register_line(&mut self, line: LineId) -> Result<(), ChainError> {
        match self.line {
            Some(registered) if registered != line => Err(ChainError::AlreadyRegistered {
                registered,
                requested: line,
            }),
            Some(_) => Ok(()),
            None => {
                self.line = Some(line);
                Ok(())
            }
        }
    }

    pub fn id(&self) -> Option<SectionId> {
        self.id
    }

    /// Sets the repository-assigned ID
    pub fn assign_id(&mut self, id: SectionId) {
        self.id = Some(id);
    }

    pub fn up_station(&self) -> StationId {
        self.up_station
    }

    pub fn down_station(&self) -> StationId {
        self.down_station
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    /// Returns true if either end is the given station
    pub fn touches(&self, station: StationId) -> bool {
        self.up_station == station || self.down_station == station
    }

    /// Returns true if both sections connect the same stations with the same distance
    pub fn same_span(&self, other: &Section) -> bool {
        self.up_station == other.up_station
            && self.down_station == other.down_station
            && self.distance == other.distance
    }

    /// Shortens this section from the up side: it now starts at `new_up`
    pub(super) fn shrink_from_up(&mut self, new_up: StationId, by: u32) {
        self.up_station = new_up;
        self.distance -= by;
        self.audit.touch();
    }

    /// Shortens this section from the down side: it now ends at `new_down`
    pub(super) fn shrink_from_down(&mut self, new_down: StationId, by: u32) {
        self.down_station = new_down;
        self.distance -= by;
        self.audit.touch();
    }

    /// Extends this section over `next`, which must start where this one ends
    pub(super) fn absorb(&mut self, next: &Section) -> Result<(), ChainError> {
        let distance = self
            .distance
            .checked_add(next.distance)
            .ok_or(InvalidSectionKind::DistanceOutOfRange)?;

        self.down_station = next.down_station;
        self.distance = distance;
        self.audit.touch();
        Ok(())
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.same_span(other) && self.line == other.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(n: u64) -> StationId {
        StationId::new(n)
    }

    #[test]
    fn create_valid_section() {
        let section = Section::create(st(1), st(2), 10).unwrap();

        assert_eq!(section.up_station(), st(1));
        assert_eq!(section.down_station(), st(2));
        assert_eq!(section.distance(), 10);
        assert!(section.id().is_none());
        assert!(section.line().is_none());
    }

    #[test]
    fn create_rejects_same_stations() {
        let err = Section::create(st(1), st(1), 10).unwrap_err();
        assert_eq!(err, ChainError::InvalidSection(InvalidSectionKind::SameStations));
    }

    #[test]
    fn create_rejects_non_positive_distance() {
        for distance in [0, -1, -100] {
            let err = Section::create(st(1), st(2), distance).unwrap_err();
            assert_eq!(
                err,
                ChainError::InvalidSection(InvalidSectionKind::NonPositiveDistance)
            );
        }
    }

    #[test]
    fn create_rejects_oversized_distance() {
        let err = Section::create(st(1), st(2), i64::from(u32::MAX) + 1).unwrap_err();
        assert!(err.is_invalid_section());
    }

    #[test]
    fn register_line_binds_once() {
        let mut section = Section::create(st(1), st(2), 5).unwrap();

        section.register_line(LineId::new(1)).unwrap();
        assert_eq!(section.line(), Some(LineId::new(1)));

        // Same line is idempotent
        section.register_line(LineId::new(1)).unwrap();

        let err = section.register_line(LineId::new(2)).unwrap_err();
        assert_eq!(
            err,
            ChainError::AlreadyRegistered {
                registered: LineId::new(1),
                requested: LineId::new(2),
            }
        );
        assert_eq!(section.line(), Some(LineId::new(1)));
    }

    #[test]
    fn absorb_sums_distance() {
        let mut first = Section::create(st(1), st(2), 4).unwrap();
        let second = Section::create(st(2), st(3), 6).unwrap();

        first.absorb(&second).unwrap();

        assert_eq!(first.down_station(), st(3));
        assert_eq!(first.distance(), 10);
    }

    #[test]
    fn absorb_rejects_overflow() {
        let mut first = Section::create(st(1), st(2), i64::from(u32::MAX)).unwrap();
        let second = Section::create(st(2), st(3), 1).unwrap();

        assert!(first.absorb(&second).is_err());
        assert_eq!(first.down_station(), st(2));
    }

    #[test]
    fn serde_roundtrip_keeps_line_and_id() {
        let mut section = Section::create(st(1), st(2), 7).unwrap();
        section.register_line(LineId::new(3)).unwrap();
        section.assign_id(SectionId::new(9));

        let json = serde_json::to_string(&section).unwrap();
        let parsed: Section = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, section);
    }
}
