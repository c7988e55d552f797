//! Window evaluation over the practice-event stream
//!
//! A window is the set of a learner's track events with id strictly greater
//! than the previous checkpoint's watermark. The watermark alone partitions
//! the stream: events answered under a prior level keep counting toward the
//! track's cumulative window.

use std::sync::Arc;
use tracing::debug;

use gradus_common::{EventId, LearnerId, Result, Track};

use crate::infra::store::EventStore;

/// Counts for one evaluation window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Events in the window
    pub total: usize,
    /// Events with a passing outcome
    pub successes: usize,
    /// Newest event id folded into the window; stays at the input watermark
    /// when the window is empty, so a no-op scan never regresses it
    pub new_watermark: Option<EventId>,
}

impl WindowStats {
    /// successes / total; 0.0 for an empty window
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successes as f64 / self.total as f64
        }
    }
}

/// Computes window statistics for (learner, track) pairs
pub struct WindowEvaluator {
    events: Arc<dyn EventStore>,
}

impl WindowEvaluator {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Fold the events newer than `watermark` into counts
    pub async fn window_since(
        &self,
        learner_id: LearnerId,
        track: Track,
        watermark: Option<EventId>,
    ) -> Result<WindowStats> {
        let events = self
            .events
            .events_since(learner_id, track, watermark)
            .await?;

        let total = events.len();
        let successes = events.iter().filter(|event| event.is_pass()).count();
        let new_watermark = events.last().map(|event| event.id).or(watermark);

        debug!(
            learner = %learner_id,
            track = %track,
            total = total,
            successes = successes,
            "Window scanned"
        );

        Ok(WindowStats {
            total,
            successes,
            new_watermark,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory_store::InMemoryStore;
    use gradus_common::{OperandRange, Outcome};

    fn setup() -> (Arc<InMemoryStore>, WindowEvaluator) {
        let store = Arc::new(InMemoryStore::new());
        let evaluator = WindowEvaluator::new(store.clone());
        (store, evaluator)
    }

    #[tokio::test]
    async fn test_counts_and_ratio() {
        let (store, evaluator) = setup();
        let node = store.load_level(
            Track::Addition,
            1,
            20,
            OperandRange::new(0, 10),
            OperandRange::new(0, 10),
        );
        let session = store.open_session(LearnerId(1));
        for _ in 0..3 {
            store.record_event(session.id, Track::Addition, Outcome::Pass, node.id);
        }
        store.record_event(session.id, Track::Addition, Outcome::Fail, node.id);

        let window = evaluator
            .window_since(LearnerId(1), Track::Addition, None)
            .await
            .unwrap();
        assert_eq!(window.total, 4);
        assert_eq!(window.successes, 3);
        assert!((window.ratio() - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_window_keeps_watermark() {
        let (_, evaluator) = setup();
        let carried = evaluator
            .window_since(LearnerId(1), Track::Addition, Some(EventId(14)))
            .await
            .unwrap();
        assert_eq!(carried.total, 0);
        assert_eq!(carried.new_watermark, Some(EventId(14)));
        assert_eq!(carried.ratio(), 0.0);

        let fresh = evaluator
            .window_since(LearnerId(1), Track::Addition, None)
            .await
            .unwrap();
        assert_eq!(fresh.new_watermark, None);
    }

    #[tokio::test]
    async fn test_watermark_advances_to_newest_event() {
        let (store, evaluator) = setup();
        let node = store.load_level(
            Track::Addition,
            1,
            20,
            OperandRange::new(0, 10),
            OperandRange::new(0, 10),
        );
        let session = store.open_session(LearnerId(1));
        store.record_event(session.id, Track::Addition, Outcome::Pass, node.id);
        let last = store.record_event(session.id, Track::Addition, Outcome::Pass, node.id);

        let window = evaluator
            .window_since(LearnerId(1), Track::Addition, None)
            .await
            .unwrap();
        assert_eq!(window.new_watermark, Some(last.id));
    }

    #[tokio::test]
    async fn test_window_spans_level_changes() {
        let (store, evaluator) = setup();
        let l1 = store.load_level(
            Track::Addition,
            1,
            20,
            OperandRange::new(0, 10),
            OperandRange::new(0, 10),
        );
        let l2 = store.load_level(
            Track::Addition,
            2,
            20,
            OperandRange::new(0, 20),
            OperandRange::new(0, 20),
        );
        let session = store.open_session(LearnerId(1));

        // Events answered under different levels of the same track all
        // count toward the cumulative stream.
        store.record_event(session.id, Track::Addition, Outcome::Pass, l1.id);
        store.record_event(session.id, Track::Addition, Outcome::Pass, l2.id);

        let window = evaluator
            .window_since(LearnerId(1), Track::Addition, None)
            .await
            .unwrap();
        assert_eq!(window.total, 2);
    }
}
