//! Placement checkpoints - the append-only audit trail of decisions
//!
//! Checkpoints are created only by the placement service, strictly via
//! append. The row with the greatest id for a (learner, track) pair is the
//! authoritative current state; every older row is history. The watermark
//! is the id of the newest event folded into the checkpoint's evaluation
//! window and is `None` only on the synthetic initialization row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ids::{CheckpointId, EventId, LearnerId, LevelNodeId};
use crate::types::track::Track;

/// Outcome of a placement evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Synthetic first checkpoint, created lazily on first access
    Initialization,
    /// Moved up to the next level of the track
    Progression,
    /// Stayed at the current level
    Stagnation,
    /// Dropped down to the previous level of the track
    Regression,
}

impl Verdict {
    /// Whether this verdict moves the learner to a different level
    pub fn moves_level(&self) -> bool {
        matches!(self, Verdict::Progression | Verdict::Regression)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Initialization => "initialization",
            Verdict::Progression => "progression",
            Verdict::Stagnation => "stagnation",
            Verdict::Regression => "regression",
        };
        f.write_str(s)
    }
}

/// Immutable snapshot of a learner's placement on one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub learner_id: LearnerId,
    pub track: Track,
    pub level_node_id: LevelNodeId,
    pub created_at: DateTime<Utc>,
    /// Success ratio of the evaluated window, rounded to four decimals;
    /// 0.0 on the initialization row
    pub success_ratio: f64,
    pub verdict: Verdict,
    /// Newest event id folded into this checkpoint's window
    pub watermark: Option<EventId>,
}

impl Checkpoint {
    pub fn is_initialization(&self) -> bool {
        self.verdict == Verdict::Initialization
    }
}

/// Append payload for a new checkpoint; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCheckpoint {
    pub learner_id: LearnerId,
    pub track: Track,
    pub level_node_id: LevelNodeId,
    pub success_ratio: f64,
    pub verdict: Verdict,
    pub watermark: Option<EventId>,
}

impl NewCheckpoint {
    /// Synthetic first checkpoint for a (learner, track) pair
    pub fn initialization(learner_id: LearnerId, track: Track, level_node_id: LevelNodeId) -> Self {
        Self {
            learner_id,
            track,
            level_node_id,
            success_ratio: 0.0,
            verdict: Verdict::Initialization,
            watermark: None,
        }
    }

    /// Checkpoint produced by an evaluation over a satisfied window
    pub fn evaluated(
        learner_id: LearnerId,
        track: Track,
        level_node_id: LevelNodeId,
        verdict: Verdict,
        success_ratio: f64,
        watermark: EventId,
    ) -> Self {
        Self {
            learner_id,
            track,
            level_node_id,
            success_ratio,
            verdict,
            watermark: Some(watermark),
        }
    }
}
