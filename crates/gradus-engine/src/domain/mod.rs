//! Placement domain logic
//!
//! Core business logic for window evaluation, level transitions, and batch
//! ingestion.

pub mod decision;
pub mod ingestion;
pub mod placement;
pub mod window;
