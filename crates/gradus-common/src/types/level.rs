//! Level nodes - the difficulty rungs of a track
//!
//! Level nodes are immutable reference data owned by curriculum authoring;
//! the engine only reads them. `level_number` totally orders the nodes of a
//! track (gaps permitted; ordering, not magnitude, matters). `criterion` is
//! the minimum number of new events required before a placement
//! re-evaluation may occur; zero or negative disables evaluation at that
//! node.

use serde::{Deserialize, Serialize};

use crate::types::ids::LevelNodeId;
use crate::types::track::Track;

/// Inclusive bounds for one generated operand
///
/// Consumed by the external exercise generator; carried here because the
/// bounds live on the curriculum rows the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandRange {
    pub min: i32,
    pub max: i32,
}

impl OperandRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Whether a generated operand falls within the bounds
    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A difficulty rung within a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelNode {
    pub id: LevelNodeId,
    pub track: Track,
    /// Position in the track's total order; gaps are permitted
    pub level_number: i32,
    /// Minimum new events before a re-evaluation; <= 0 disables evaluation
    pub criterion: i32,
    /// Bounds for the first generated operand
    pub operand_one: OperandRange,
    /// Bounds for the second generated operand
    pub operand_two: OperandRange,
}

impl LevelNode {
    pub fn new(
        id: LevelNodeId,
        track: Track,
        level_number: i32,
        criterion: i32,
        operand_one: OperandRange,
        operand_two: OperandRange,
    ) -> Self {
        Self {
            id,
            track,
            level_number,
            criterion,
            operand_one,
            operand_two,
        }
    }

    /// Whether placement evaluation is enabled at this node
    pub fn evaluation_enabled(&self) -> bool {
        self.criterion > 0
    }
}

/// The rungs adjacent to a level number within one track
///
/// Absence of `prev` (bottom of the track) or `next` (top of the track) is
/// an expected state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelNeighbors {
    pub prev: Option<LevelNode>,
    pub current: LevelNode,
    pub next: Option<LevelNode>,
}

impl LevelNeighbors {
    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(level_number: i32, criterion: i32) -> LevelNode {
        LevelNode::new(
            LevelNodeId(level_number as u64),
            Track::Addition,
            level_number,
            criterion,
            OperandRange::new(0, 10),
            OperandRange::new(0, 10),
        )
    }

    #[test]
    fn test_operand_range_contains() {
        let range = OperandRange::new(2, 9);
        assert!(range.contains(2));
        assert!(range.contains(9));
        assert!(!range.contains(10));
    }

    #[test]
    fn test_evaluation_enabled() {
        assert!(node(1, 20).evaluation_enabled());
        assert!(!node(1, 0).evaluation_enabled());
        assert!(!node(1, -5).evaluation_enabled());
    }

    #[test]
    fn test_neighbors_at_track_edges() {
        let bottom = LevelNeighbors {
            prev: None,
            current: node(1, 20),
            next: Some(node(2, 20)),
        };
        assert!(!bottom.has_prev());
        assert!(bottom.has_next());
    }
}
