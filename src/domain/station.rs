//! Station domain model
//!
//! Stations are the points a line's sections connect. Only the identity
//! matters to chain logic; the name is carried for display.

use serde::{Deserialize, Serialize};

use super::audit::Audit;
use super::id::StationId;

/// A station in the network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Station {
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            audit: Audit::now(),
        }
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}

impl std::hash::Hash for Station {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_identity() {
        let a = Station::new(StationId::new(1), "Gangnam");
        let renamed = Station::new(StationId::new(1), "Gangnam Station");
        let other = Station::new(StationId::new(2), "Gangnam");

        assert_eq!(a, renamed);
        assert_ne!(a, other);
    }
}
