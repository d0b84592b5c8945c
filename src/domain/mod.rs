//! Domain models for subway
//!
//! Contains the section-chain logic without any I/O concerns.

mod id;
mod audit;
mod error;
mod station;
mod section;
mod chain;
mod line;

pub use id::{IdError, LineId, SectionId, StationId};
pub use audit::Audit;
pub use error::{ChainError, InvalidSectionKind};
pub use station::Station;
pub use section::Section;
pub use chain::{OrderedStations, SectionChange, Sections};
pub use line::Line;
