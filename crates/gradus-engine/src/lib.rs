//! # Gradus Engine
//!
//! Level placement from practice evidence.
//!
//! The engine watches the pass/fail outcomes a learner produces on each
//! arithmetic track and decides, from sliding windows of recent attempts,
//! whether the learner moves up a level, moves down, or stays put. Every
//! decision is appended to a checkpoint log; the latest checkpoint carries
//! a watermark splitting the event stream into already-judged history and
//! the window still accumulating.
//!
//! ## Key Concepts
//!
//! - **Practice Event**: one pass/fail attempt, ordered by a monotonic id
//! - **Checkpoint**: append-only record of where a (learner, track) pair stands
//! - **Window**: the events strictly after the latest checkpoint's watermark
//! - **Transition Rule**: pure thresholds mapping a window's success ratio to
//!   progression, stagnation, or regression
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      BatchProcessor                      │
//! │        (recorded events → touched pairs → report)        │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │
//! ┌────────────────────────────┴─────────────────────────────┐
//! │                     PlacementService                     │
//! │  ┌──────────────┐  ┌───────────────┐  ┌──────────────┐   │
//! │  │  LevelGraph  │  │    Window     │  │  Transition  │   │
//! │  │  (neighbors) │  │   Evaluator   │  │     Rule     │   │
//! │  └──────┬───────┘  └───────┬───────┘  └──────────────┘   │
//! │         │                  │                             │
//! │  ┌──────┴──────────────────┴──────────────────────────┐  │
//! │  │    EventStore  /  CheckpointStore (append-only)    │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod domain;
pub mod infra;

// Re-export core types
pub use gradus_common::{
    Checkpoint, GradusError, LearnerId, LevelNode, Outcome, PracticeEvent, Result, Track, Verdict,
};

// Re-export the engine surface
pub use config::EngineConfig;
pub use domain::decision::TransitionRule;
pub use domain::ingestion::{BatchProcessor, BatchReport};
pub use domain::placement::{Decision, PlacementService, TrackPosition};
pub use domain::window::{WindowEvaluator, WindowStats};

// Re-export infrastructure
pub use infra::memory_store::InMemoryStore;
pub use infra::store::{CheckpointStore, EventStore, LevelGraph};

/// Engine version
pub const ENGINE_VERSION: &str = "0.1.0";

/// Immediate retries after a checkpoint append conflict
pub const DEFAULT_CONFLICT_RETRIES: u32 = 1;

/// Pairs evaluated in flight per ingestion batch
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;
