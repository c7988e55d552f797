//! Error types for the Gradus engine
//!
//! Provides the unified error type shared by every crate in the workspace

use thiserror::Error;

use crate::types::ids::{LearnerId, LevelNodeId};
use crate::types::track::Track;

/// Result type alias using GradusError
pub type Result<T> = std::result::Result<T, GradusError>;

/// Unified error type for Gradus operations
#[derive(Debug, Error)]
pub enum GradusError {
    // Curriculum configuration errors
    #[error("No levels configured for track {track}")]
    NoLevelsConfigured { track: Track },

    // Data corruption: a checkpoint points at a level node that no longer resolves
    #[error("Dangling level reference: node {level_node_id} does not exist")]
    DanglingLevelReference { level_node_id: LevelNodeId },

    // Transient store failures
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    // Optimistic append lost the race for the latest checkpoint
    #[error("Concurrent checkpoint append for learner {learner_id} on track {track}")]
    ConcurrentCheckpointConflict { learner_id: LearnerId, track: Track },

    // Ingestion-side category label that resolves to no track
    #[error("Unknown track label: {0}")]
    UnknownTrack(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GradusError {
    /// Whether the caller may retry the failed call as-is.
    ///
    /// Configuration and corruption errors are final; transient store
    /// failures and optimistic-append races are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GradusError::StoreUnavailable(_) | GradusError::ConcurrentCheckpointConflict { .. }
        )
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for GradusError {
    fn from(err: serde_json::Error) -> Self {
        GradusError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for GradusError {
    fn from(err: anyhow::Error) -> Self {
        GradusError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GradusError::NoLevelsConfigured {
            track: Track::Multiplication,
        };
        assert!(err.to_string().contains("Multiplication"));
    }

    #[test]
    fn test_dangling_reference_display() {
        let err = GradusError::DanglingLevelReference {
            level_node_id: LevelNodeId(42),
        };
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_retryable_classification() {
        let conflict = GradusError::ConcurrentCheckpointConflict {
            learner_id: LearnerId(7),
            track: Track::Addition,
        };
        assert!(conflict.is_retryable());
        assert!(GradusError::StoreUnavailable("timeout".to_string()).is_retryable());
        assert!(!GradusError::NoLevelsConfigured {
            track: Track::Addition
        }
        .is_retryable());
        assert!(!GradusError::UnknownTrack("division".to_string()).is_retryable());
    }
}
