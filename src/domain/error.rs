//! Errors raised by section and chain operations

use thiserror::Error;

use super::id::{LineId, StationId};

/// Why a candidate section was rejected as malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSectionKind {
    /// Up and down stations are the same
    SameStations,
    /// Distance is zero or negative
    NonPositiveDistance,
    /// Distance does not fit in the stored range
    DistanceOutOfRange,
    /// Both stations are already on the line
    StationsAlreadyRegistered,
    /// Neither station is on the line
    StationsNotConnected,
}

impl std::fmt::Display for InvalidSectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            InvalidSectionKind::SameStations => "up and down stations must differ",
            InvalidSectionKind::NonPositiveDistance => "distance must be greater than zero",
            InvalidSectionKind::DistanceOutOfRange => "distance is out of range",
            InvalidSectionKind::StationsAlreadyRegistered => "stations already both registered",
            InvalidSectionKind::StationsNotConnected => {
                "stations not connected to existing line"
            }
        };
        f.write_str(message)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ChainError {
    #[error("Invalid section: {0}")]
    InvalidSection(InvalidSectionKind),

    #[error("Section is already registered to line {registered}, cannot bind to {requested}")]
    AlreadyRegistered {
        registered: LineId,
        requested: LineId,
    },

    #[error("Section distance {distance} must be shorter than the section it splits ({existing})")]
    DistanceTooLong { distance: u32, existing: u32 },

    #[error("Station {0} is not on this line")]
    StationNotInLine(StationId),

    #[error("Cannot remove a station from a line with only {0} section(s)")]
    CannotRemove(usize),

    #[error("Stored sections do not form a single path: {0}")]
    CorruptChain(String),
}

impl ChainError {
    /// Returns true for the malformed-section family of errors
    pub fn is_invalid_section(&self) -> bool {
        matches!(self, ChainError::InvalidSection(_))
    }
}

impl From<InvalidSectionKind> for ChainError {
    fn from(kind: InvalidSectionKind) -> Self {
        ChainError::InvalidSection(kind)
    }
}
