//! subway - Line and section management for a subway network
//!
//! A line is an ordered chain of sections between stations. Sections can
//! extend either end of a line or split an existing section; removing a
//! station merges the two sections around it. The chain always stays a
//! single simple path.

pub mod cli;
pub mod domain;
pub mod logging;
pub mod service;
pub mod storage;

pub use domain::{ChainError, Line, LineId, Section, SectionId, Sections, Station, StationId};
pub use service::{LineService, NetworkRepository, ServiceError};
