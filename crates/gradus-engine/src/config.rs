//! Engine configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Operational knobs for the placement engine.
///
/// Transition thresholds are deliberately not configurable; they are part
/// of the rule itself and live as constants next to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Immediate retries after a checkpoint append conflict
    pub conflict_retries: u32,
    /// Pairs evaluated in flight per ingestion batch
    pub batch_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conflict_retries: crate::DEFAULT_CONFLICT_RETRIES,
            batch_concurrency: crate::DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        if let Ok(val) = std::env::var("GRADUS_CONFLICT_RETRIES") {
            if let Ok(v) = val.parse() {
                cfg.conflict_retries = v;
            }
        }
        if let Ok(val) = std::env::var("GRADUS_BATCH_CONCURRENCY") {
            if let Ok(v) = val.parse() {
                cfg.batch_concurrency = v;
            }
        }

        Ok(cfg)
    }
}
