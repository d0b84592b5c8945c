//! Audit timestamps shared by stations, lines and sections
//!
//! Timestamps are set explicitly at write time: `Audit::now()` when a
//! record is created and `touch()` whenever it is modified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation and last-modification timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Audit {
    /// Creates an audit record stamped with the current time
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            modified_at: now,
        }
    }

    /// Marks the record as modified now
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

impl Default for Audit {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_audit_has_equal_timestamps() {
        let audit = Audit::now();
        assert_eq!(audit.created_at, audit.modified_at);
    }

    #[test]
    fn touch_moves_modified_only() {
        let mut audit = Audit::now();
        let created = audit.created_at;

        audit.touch();

        assert_eq!(audit.created_at, created);
        assert!(audit.modified_at >= created);
    }
}
