//! Batch ingestion adapter
//!
//! Bridges event recording and placement: after a batch of practice events
//! has been durably recorded, this resolves the touched (learner, track)
//! pairs through the owning sessions and runs one evaluation per pair. The
//! batch acknowledgment never fails on evaluation problems; the first error
//! is carried in the report instead, since the events themselves are
//! already on disk.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use gradus_common::{LearnerId, PracticeEvent, Result, SessionId, Track};

use crate::domain::placement::{Decision, PlacementService, TrackPosition};
use crate::infra::store::EventStore;

/// Outcome of one ingestion batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    /// Number of events acknowledged in this batch
    pub recorded: usize,
    /// Placement decisions produced by the batch, one per pair at most
    pub decisions: Vec<Decision>,
    /// Current positions of every learner touched by the batch
    pub positions: BTreeMap<LearnerId, BTreeMap<Track, TrackPosition>>,
    /// First evaluation failure, if any; the recorded events stand
    pub evaluation_error: Option<String>,
}

impl BatchReport {
    fn empty(recorded: usize) -> Self {
        Self {
            batch_id: Uuid::now_v7(),
            recorded,
            decisions: Vec::new(),
            positions: BTreeMap::new(),
            evaluation_error: None,
        }
    }
}

/// Runs placement over freshly recorded event batches
pub struct BatchProcessor {
    events: Arc<dyn EventStore>,
    placement: Arc<PlacementService>,
    concurrency: usize,
}

impl BatchProcessor {
    pub fn new(events: Arc<dyn EventStore>, placement: Arc<PlacementService>) -> Self {
        Self {
            events,
            placement,
            concurrency: crate::DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Override how many pairs are evaluated in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Evaluate every (learner, track) pair a recorded batch touched.
    ///
    /// Events whose session cannot be resolved are acknowledged but skipped
    /// for evaluation. Pairs are evaluated at most once regardless of how
    /// many batch events they cover.
    #[instrument(skip(self, recorded), fields(batch_len = recorded.len()))]
    pub async fn process_recorded(&self, recorded: &[PracticeEvent]) -> Result<BatchReport> {
        let mut report = BatchReport::empty(recorded.len());
        if recorded.is_empty() {
            return Ok(report);
        }

        let session_ids: Vec<SessionId> = recorded
            .iter()
            .map(|e| e.session_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let owners = match self.events.session_learners(&session_ids).await {
            Ok(owners) => owners,
            Err(e) => {
                warn!(batch = %report.batch_id, error = %e, "Session resolution failed");
                report.evaluation_error = Some(e.to_string());
                return Ok(report);
            }
        };

        let mut pairs = BTreeSet::new();
        for event in recorded {
            match owners.get(&event.session_id) {
                Some(&learner) => {
                    pairs.insert((learner, event.track));
                }
                None => {
                    warn!(
                        batch = %report.batch_id,
                        session = %event.session_id,
                        "Recorded event references an unknown session, skipping"
                    );
                }
            }
        }

        let evaluations = stream::iter(pairs.iter().copied().map(|(learner, track)| {
            let placement = self.placement.clone();
            async move {
                let outcome = placement.evaluate_if_due(learner, track).await;
                (learner, track, outcome)
            }
        }))
        .buffered(self.concurrency)
        .collect::<Vec<_>>()
        .await;

        for (learner, track, outcome) in evaluations {
            match outcome {
                Ok(Some(decision)) => report.decisions.push(decision),
                Ok(None) => {}
                Err(e) => {
                    report
                        .evaluation_error
                        .get_or_insert_with(|| format!("{learner}/{track}: {e}"));
                }
            }
        }

        let learners: BTreeSet<LearnerId> = pairs.iter().map(|(learner, _)| *learner).collect();
        let lookups = stream::iter(learners.into_iter().map(|learner| {
            let placement = self.placement.clone();
            async move { (learner, placement.positions_for_learner(learner).await) }
        }))
        .buffered(self.concurrency)
        .collect::<Vec<_>>()
        .await;

        for (learner, outcome) in lookups {
            match outcome {
                Ok(positions) => {
                    report.positions.insert(learner, positions);
                }
                Err(e) => {
                    report
                        .evaluation_error
                        .get_or_insert_with(|| format!("{learner}: {e}"));
                }
            }
        }

        info!(
            batch = %report.batch_id,
            recorded = report.recorded,
            decisions = report.decisions.len(),
            learners = report.positions.len(),
            "Batch processed"
        );
        Ok(report)
    }
}
