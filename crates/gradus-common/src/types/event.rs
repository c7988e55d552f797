//! Practice sessions and the append-only practice-event log
//!
//! Events are never mutated or deleted, and they do not carry a learner id:
//! each event belongs to a practice session, and the session belongs to the
//! learner. Event id order, not wall-clock time, defines "since".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ids::{EventId, LearnerId, LevelNodeId, SessionId};
use crate::types::track::Track;

/// Pass/fail outcome of one answered exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("pass"),
            Outcome::Fail => f.write_str("fail"),
        }
    }
}

/// A practice session; the join point between events and learners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSession {
    pub id: SessionId,
    pub learner_id: LearnerId,
    pub started_at: DateTime<Utc>,
}

/// One answered exercise, as recorded by the ingestion path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeEvent {
    pub id: EventId,
    pub session_id: SessionId,
    pub track: Track,
    pub outcome: Outcome,
    /// Level the learner was placed at when answering
    pub level_node_id: LevelNodeId,
}

impl PracticeEvent {
    pub fn is_pass(&self) -> bool {
        self.outcome.is_pass()
    }
}
