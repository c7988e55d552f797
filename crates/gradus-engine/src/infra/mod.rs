//! Storage infrastructure
//!
//! Ports for the level graph and the event/checkpoint stores, plus the
//! in-memory implementation used for tests and single-process deployments.

pub mod memory_store;
pub mod store;
