//! Placement service
//!
//! Orchestrates the level graph, the window evaluator, and the transition
//! rule over the append-only checkpoint log. All state changes go through
//! the conditional checkpoint append: an evaluation that loses the race for
//! the latest checkpoint retries once against the new head and otherwise
//! surfaces the conflict. Different (learner, track) pairs never contend.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use gradus_common::{
    Checkpoint, CheckpointId, GradusError, LearnerId, LevelNode, LevelNodeId, NewCheckpoint,
    Result, Track, Verdict,
};

use crate::domain::decision::{round_ratio, TransitionRule};
use crate::domain::window::WindowEvaluator;
use crate::infra::store::{CheckpointStore, EventStore, LevelGraph};

/// A level as surfaced in decisions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelRef {
    pub level_node_id: LevelNodeId,
    pub level_number: i32,
}

impl From<&LevelNode> for LevelRef {
    fn from(node: &LevelNode) -> Self {
        Self {
            level_node_id: node.id,
            level_number: node.level_number,
        }
    }
}

/// Result of one placement evaluation, surfaced to callers for in-product
/// feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub learner_id: LearnerId,
    pub track: Track,
    pub origin: LevelRef,
    pub destination: LevelRef,
    pub verdict: Verdict,
    /// Success ratio of the evaluated window, rounded to four decimals
    pub success_ratio: f64,
    pub window_total: usize,
    pub window_successes: usize,
    /// The checkpoint this evaluation appended
    pub checkpoint_id: CheckpointId,
}

/// A learner's current rung on one track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPosition {
    pub level_node_id: LevelNodeId,
    pub level_number: i32,
    pub criterion: i32,
}

impl From<&LevelNode> for TrackPosition {
    fn from(node: &LevelNode) -> Self {
        Self {
            level_node_id: node.id,
            level_number: node.level_number,
            criterion: node.criterion,
        }
    }
}

/// Decides, per (learner, track), whether to move up, move down, or stay
pub struct PlacementService {
    levels: Arc<dyn LevelGraph>,
    checkpoints: Arc<dyn CheckpointStore>,
    window: WindowEvaluator,
    rule: TransitionRule,
    conflict_retries: u32,
}

impl PlacementService {
    pub fn new(
        levels: Arc<dyn LevelGraph>,
        events: Arc<dyn EventStore>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            levels,
            checkpoints,
            window: WindowEvaluator::new(events),
            rule: TransitionRule,
            conflict_retries: crate::DEFAULT_CONFLICT_RETRIES,
        }
    }

    /// Override the number of immediate retries after an append conflict
    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    /// Return the latest checkpoint for the pair, creating the synthetic
    /// initialization checkpoint at the track's initial level if none
    /// exists. Losing the creation race falls back to the winner's row, so
    /// exactly one initialization is ever appended per pair.
    #[instrument(skip(self))]
    pub async fn ensure_initialized(
        &self,
        learner_id: LearnerId,
        track: Track,
    ) -> Result<Checkpoint> {
        if let Some(existing) = self.checkpoints.latest(learner_id, track).await? {
            return Ok(existing);
        }

        let initial = self.levels.initial_level(track).await?;
        let seed = NewCheckpoint::initialization(learner_id, track, initial.id);

        match self.checkpoints.append(seed, None).await {
            Ok(created) => {
                info!(
                    learner = %learner_id,
                    track = %track,
                    level = %initial.id,
                    "Initialized placement"
                );
                Ok(created)
            }
            Err(GradusError::ConcurrentCheckpointConflict { .. }) => {
                // Another call initialized the pair first; its row wins.
                self.checkpoints
                    .latest(learner_id, track)
                    .await?
                    .ok_or_else(|| {
                        GradusError::Internal(
                            "latest checkpoint missing after initialization conflict".to_string(),
                        )
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Evaluate the pair's pending window and append a checkpoint when it
    /// satisfies the level's criterion.
    ///
    /// Returns `Ok(None)` when there is nothing to do: evaluation disabled
    /// at the current node, or not enough new events yet (the partial
    /// window is preserved and keeps accumulating). An append conflict is
    /// retried once against the now-current latest checkpoint.
    #[instrument(skip(self))]
    pub async fn evaluate_if_due(
        &self,
        learner_id: LearnerId,
        track: Track,
    ) -> Result<Option<Decision>> {
        let mut attempts = 0;
        loop {
            match self.evaluate_once(learner_id, track).await {
                Err(GradusError::ConcurrentCheckpointConflict { .. })
                    if attempts < self.conflict_retries =>
                {
                    attempts += 1;
                    warn!(
                        learner = %learner_id,
                        track = %track,
                        attempt = attempts,
                        "Checkpoint append conflict, retrying against new head"
                    );
                }
                outcome => return outcome,
            }
        }
    }

    async fn evaluate_once(
        &self,
        learner_id: LearnerId,
        track: Track,
    ) -> Result<Option<Decision>> {
        let checkpoint = self.ensure_initialized(learner_id, track).await?;
        let node = self.levels.resolve(checkpoint.level_node_id).await?;

        if !node.evaluation_enabled() {
            debug!(
                learner = %learner_id,
                track = %track,
                level = %node.id,
                "Evaluation disabled at this node"
            );
            return Ok(None);
        }

        let window = self
            .window
            .window_since(learner_id, track, checkpoint.watermark)
            .await?;
        if window.total < node.criterion as usize {
            debug!(
                learner = %learner_id,
                track = %track,
                total = window.total,
                criterion = node.criterion,
                "Window below criterion"
            );
            return Ok(None);
        }

        let neighbors = self.levels.neighbors(&node).await?;
        let ratio = window.ratio();
        let verdict = self
            .rule
            .decide(ratio, neighbors.has_prev(), neighbors.has_next());

        let destination = match verdict {
            Verdict::Progression => neighbors.next,
            Verdict::Regression => neighbors.prev,
            _ => None,
        }
        .unwrap_or_else(|| node.clone());

        let watermark = match window.new_watermark {
            Some(id) => id,
            // A satisfied window always contains at least one event.
            None => {
                return Err(GradusError::Internal(
                    "window met the criterion without observing any event".to_string(),
                ))
            }
        };

        let rounded = round_ratio(ratio);
        let payload = NewCheckpoint::evaluated(
            learner_id,
            track,
            destination.id,
            verdict,
            rounded,
            watermark,
        );
        let appended = self.checkpoints.append(payload, Some(checkpoint.id)).await?;

        info!(
            learner = %learner_id,
            track = %track,
            verdict = %verdict,
            from_level = node.level_number,
            to_level = destination.level_number,
            ratio = rounded,
            "Placement evaluated"
        );

        Ok(Some(Decision {
            learner_id,
            track,
            origin: LevelRef::from(&node),
            destination: LevelRef::from(&destination),
            verdict,
            success_ratio: rounded,
            window_total: window.total,
            window_successes: window.successes,
            checkpoint_id: appended.id,
        }))
    }

    /// Current level per track, initializing lazily, never evaluating
    #[instrument(skip(self))]
    pub async fn positions_for_learner(
        &self,
        learner_id: LearnerId,
    ) -> Result<BTreeMap<Track, TrackPosition>> {
        let lookups = Track::ALL.into_iter().map(|track| async move {
            let checkpoint = self.ensure_initialized(learner_id, track).await?;
            let node = self.levels.resolve(checkpoint.level_node_id).await?;
            Ok::<(Track, TrackPosition), GradusError>((track, TrackPosition::from(&node)))
        });

        let positions = try_join_all(lookups).await?;
        Ok(positions.into_iter().collect())
    }
}
