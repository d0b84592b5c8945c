//! Typed identifiers for stations, lines and sections
//!
//! ID Format:
//! - Station IDs: `st-{n}` (e.g., `st-3`)
//! - Line IDs: `ln-{n}` (e.g., `ln-1`)
//! - Section IDs: `sec-{n}` (e.g., `sec-12`)
//!
//! Numbers are allocated sequentially by the repository. Parsing accepts
//! either the prefixed form or the bare number, so `st-3` and `3` name the
//! same station on the command line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid station ID format: expected 'st-{{n}}' or a number, got '{0}'")]
    InvalidStationId(String),

    #[error("Invalid line ID format: expected 'ln-{{n}}' or a number, got '{0}'")]
    InvalidLineId(String),

    #[error("Invalid section ID format: expected 'sec-{{n}}' or a number, got '{0}'")]
    InvalidSectionId(String),
}

/// Parses `{prefix}-{n}` or a bare `{n}`
fn parse_prefixed(s: &str, prefix: &str) -> Option<u64> {
    let s = s.trim();
    let digits = s
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(s);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $err:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the numeric part of the ID
            pub fn value(&self) -> u64 {
                self.0
            }

            /// Returns the ID following this one, or `None` past `u64::MAX`
            pub fn next(&self) -> Option<Self> {
                self.0.checked_add(1).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_prefixed(s, $prefix)
                    .map(Self)
                    .ok_or_else(|| IdError::$err(s.trim().to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

numeric_id!(
    /// Station ID in the format `st-{n}`
    StationId,
    "st",
    InvalidStationId
);

numeric_id!(
    /// Line ID in the format `ln-{n}`
    LineId,
    "ln",
    InvalidLineId
);

numeric_id!(
    /// Section ID in the format `sec-{n}`
    SectionId,
    "sec",
    InvalidSectionId
);
