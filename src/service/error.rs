//! Errors surfaced by the line service and repository contract

use thiserror::Error;

use crate::domain::{ChainError, LineId, SectionId, StationId};

#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("Station not found: {0}")]
    StationNotFound(StationId),

    #[error("Line not found: {0}")]
    LineNotFound(LineId),

    #[error("Section not found: {0}")]
    SectionNotFound(SectionId),

    #[error("A line named '{0}' already exists")]
    DuplicateLineName(String),

    #[error("Station {0} is still used by a section")]
    StationInUse(StationId),

    #[error("Name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl ServiceError {
    /// Returns true for lookup misses
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::StationNotFound(_)
                | ServiceError::LineNotFound(_)
                | ServiceError::SectionNotFound(_)
        )
    }
}
