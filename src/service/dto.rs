//! Request and response shapes for line and section operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LineId, Section, SectionId, Station, StationId};

/// Request to create a line together with its first section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRequest {
    pub name: String,
    pub color: String,
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: i64,
}

impl LineRequest {
    /// The first section of the new line
    pub fn section_request(&self) -> SectionRequest {
        SectionRequest {
            up_station_id: self.up_station_id,
            down_station_id: self.down_station_id,
            distance: self.distance,
        }
    }
}

/// Request to add a section to an existing line
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SectionRequest {
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationResponse {
    pub id: StationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl StationResponse {
    pub fn of(station: &Station) -> Self {
        Self {
            id: station.id,
            name: station.name.clone(),
            created_at: station.audit.created_at,
            modified_at: station.audit.modified_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LineResponse {
    pub id: LineId,
    pub name: String,
    pub color: String,
    /// Stations in path order
    pub stations: Vec<StationResponse>,
    /// Sections in path order
    pub sections: Vec<SectionResponse>,
    pub total_distance: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionResponse {
    pub id: Option<SectionId>,
    pub line_id: Option<LineId>,
    pub up_station: StationResponse,
    pub down_station: StationResponse,
    pub distance: u32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl SectionResponse {
    pub fn of(section: &Section, up_station: &Station, down_station: &Station) -> Self {
        Self {
            id: section.id(),
            line_id: section.line(),
            up_station: StationResponse::of(up_station),
            down_station: StationResponse::of(down_station),
            distance: section.distance(),
            created_at: section.audit.created_at,
            modified_at: section.audit.modified_at,
        }
    }
}

/// Effect of a section mutation as seen by callers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ChangeResponse {
    Added {
        section: SectionResponse,
        shrunk: Option<SectionResponse>,
    },
    Removed {
        removed: SectionResponse,
        merged: Option<SectionResponse>,
    },
}
