//! # Gradus Common
//!
//! Shared domain types and errors for the Gradus learner-progression engine.
//!
//! ## Core Types
//!
//! - [`Track`]: an independently progressed skill category
//! - [`LevelNode`]: a difficulty rung with an evaluation sample-size criterion
//! - [`PracticeEvent`]: one pass/fail answer in the append-only event log
//! - [`Checkpoint`]: an appended record of a placement decision and the
//!   window that produced it
//! - [`Verdict`]: initialization, progression, stagnation, or regression
//!
//! ## Errors
//!
//! - [`GradusError`]: unified taxonomy with a retryability split between
//!   transient store failures / append races and fatal configuration or
//!   corruption errors

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{GradusError, Result};
pub use types::{
    checkpoint::{Checkpoint, NewCheckpoint, Verdict},
    event::{Outcome, PracticeEvent, PracticeSession},
    ids::{CheckpointId, EventId, LearnerId, LevelNodeId, SessionId},
    level::{LevelNeighbors, LevelNode, OperandRange},
    track::Track,
};

/// Gradus version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Success ratio strictly above which a learner moves up a level
pub const PROGRESSION_THRESHOLD: f64 = 0.95;

/// Success ratio strictly below which a learner drops down a level
pub const REGRESSION_THRESHOLD: f64 = 0.5;

/// Decimal places kept when persisting a success ratio
pub const RATIO_DECIMALS: u32 = 4;
