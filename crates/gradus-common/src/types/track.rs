//! Skill tracks
//!
//! A track is an independently progressed skill category. The set is fixed
//! by the curriculum: three arithmetic operation kinds. Each track carries a
//! canonical event-category label; ingestion payloads are parsed leniently
//! (case-insensitive) and unknown labels are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GradusError;

/// A skill category with its own level progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Track {
    Addition,
    Subtraction,
    Multiplication,
}

impl Track {
    /// All tracks, in canonical order
    pub const ALL: [Track; 3] = [Track::Addition, Track::Subtraction, Track::Multiplication];

    /// Canonical event-category label stored on practice events
    pub fn label(&self) -> &'static str {
        match self {
            Track::Addition => "Addition",
            Track::Subtraction => "Subtraction",
            Track::Multiplication => "Multiplication",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Track {
    type Err = GradusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "addition" => Ok(Track::Addition),
            "subtraction" => Ok(Track::Subtraction),
            "multiplication" => Ok(Track::Multiplication),
            _ => Err(GradusError::UnknownTrack(s.to_string())),
        }
    }
}
