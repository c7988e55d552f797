//! Core data types for the Gradus progression engine

pub mod checkpoint;
pub mod event;
pub mod ids;
pub mod level;
pub mod track;
