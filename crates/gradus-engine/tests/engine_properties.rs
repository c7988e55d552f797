//! Property-based tests for the placement engine
//!
//! These feed randomized outcome streams through the full service and check
//! the invariants that must hold for any input:
//! - Partition: checkpoints split the event stream into criterion-sized
//!   windows with no gaps and no overlaps
//! - Monotonicity: watermarks only ever advance
//! - Replay: every verdict matches a straightforward replay of the
//!   transition thresholds over the same windows

use proptest::prelude::*;
use std::sync::Arc;

use gradus_common::{
    Checkpoint, EventId, LearnerId, LevelNode, OperandRange, Outcome, Track, Verdict,
    PROGRESSION_THRESHOLD, REGRESSION_THRESHOLD,
};
use gradus_engine::{CheckpointStore, Decision, InMemoryStore, PlacementService};

const LEVEL_NUMBERS: [i32; 3] = [10, 20, 30];

fn outcome_stream() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..160)
}

/// Record the stream one event at a time, evaluating after each, and return
/// the recorded ids, the decisions produced, the checkpoint history, and
/// the configured levels.
fn run_engine(
    outcomes: &[bool],
    criterion: i32,
) -> (Vec<EventId>, Vec<Decision>, Vec<Checkpoint>, Vec<LevelNode>) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    rt.block_on(async {
        let store = Arc::new(InMemoryStore::new());
        let range = OperandRange::new(0, 10);
        let nodes: Vec<_> = LEVEL_NUMBERS
            .iter()
            .map(|&n| store.load_level(Track::Addition, n, criterion, range, range))
            .collect();
        let service = PlacementService::new(store.clone(), store.clone(), store.clone());
        let session = store.open_session(LearnerId(1));

        let mut ids = Vec::new();
        let mut decisions = Vec::new();
        let mut current = 0usize;
        for &pass in outcomes {
            let outcome = if pass { Outcome::Pass } else { Outcome::Fail };
            let event =
                store.record_event(session.id, Track::Addition, outcome, nodes[current].id);
            ids.push(event.id);

            if let Some(decision) = service
                .evaluate_if_due(LearnerId(1), Track::Addition)
                .await
                .expect("evaluation")
            {
                current = LEVEL_NUMBERS
                    .iter()
                    .position(|&n| n == decision.destination.level_number)
                    .expect("destination is a configured level");
                decisions.push(decision);
            }
        }

        let history = store
            .history(LearnerId(1), Track::Addition)
            .await
            .expect("history");
        (ids, decisions, history, nodes)
    })
}

/// Replay the thresholds over criterion-sized windows of the same stream.
fn replay(outcomes: &[bool], criterion: i32) -> Vec<(Verdict, f64, i32)> {
    let mut level = 0usize;
    let mut expected = Vec::new();
    for window in outcomes.chunks(criterion as usize) {
        if window.len() < criterion as usize {
            break;
        }
        let passes = window.iter().filter(|&&p| p).count();
        let ratio = passes as f64 / criterion as f64;
        let verdict = if ratio > PROGRESSION_THRESHOLD && level + 1 < LEVEL_NUMBERS.len() {
            level += 1;
            Verdict::Progression
        } else if ratio < REGRESSION_THRESHOLD && level > 0 {
            level -= 1;
            Verdict::Regression
        } else {
            Verdict::Stagnation
        };
        let rounded = (ratio * 10_000.0).round() / 10_000.0;
        expected.push((verdict, rounded, LEVEL_NUMBERS[level]));
    }
    expected
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the checkpoint log partitions the stream into exactly
    /// criterion-sized windows, and watermarks advance strictly
    #[test]
    fn prop_checkpoint_log_partitions_the_stream(
        outcomes in outcome_stream(),
        criterion in 1..12i32,
    ) {
        let (ids, decisions, history, _) = run_engine(&outcomes, criterion);

        let full_windows = outcomes.len() / criterion as usize;
        prop_assert_eq!(decisions.len(), full_windows);
        prop_assert_eq!(history.len(), full_windows + 1);

        prop_assert!(history[0].watermark.is_none());
        for (k, checkpoint) in history.iter().skip(1).enumerate() {
            // Window k ends at the (k+1) * criterion-th recorded event.
            let boundary = ids[(k + 1) * criterion as usize - 1];
            prop_assert_eq!(checkpoint.watermark, Some(boundary));
        }

        let marks: Vec<_> = history.iter().filter_map(|c| c.watermark).collect();
        prop_assert!(marks.windows(2).all(|pair| pair[0] < pair[1]));

        for decision in &decisions {
            prop_assert_eq!(decision.window_total, criterion as usize);
        }
    }

    /// Property: every verdict, ratio, and destination matches a direct
    /// replay of the thresholds over the same windows
    #[test]
    fn prop_verdicts_replay_the_transition_thresholds(
        outcomes in outcome_stream(),
        criterion in 1..12i32,
    ) {
        let (_, decisions, history, nodes) = run_engine(&outcomes, criterion);
        let expected = replay(&outcomes, criterion);

        prop_assert_eq!(decisions.len(), expected.len());
        for (decision, (verdict, ratio, level_number)) in decisions.iter().zip(&expected) {
            prop_assert_eq!(decision.verdict, *verdict);
            prop_assert!((decision.success_ratio - ratio).abs() < 1e-9);
            prop_assert_eq!(decision.destination.level_number, *level_number);
        }

        // The checkpoint log mirrors the decisions one-to-one.
        prop_assert_eq!(history.len(), expected.len() + 1);
        for (checkpoint, (verdict, ratio, _)) in history.iter().skip(1).zip(&expected) {
            prop_assert_eq!(checkpoint.verdict, *verdict);
            prop_assert!((checkpoint.success_ratio - ratio).abs() < 1e-9);
        }

        // The latest checkpoint agrees with the replayed end state.
        let final_level = expected
            .last()
            .map(|(_, _, level)| *level)
            .unwrap_or(LEVEL_NUMBERS[0]);
        let latest = history.last().expect("at least the initialization row");
        let latest_level = nodes
            .iter()
            .find(|n| n.id == latest.level_node_id)
            .map(|n| n.level_number);
        prop_assert_eq!(latest_level, Some(final_level));
    }

    /// Property: reading positions never appends beyond the initialization
    /// checkpoint, no matter how many events are pending
    #[test]
    fn prop_positions_never_evaluate(outcomes in outcome_stream()) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        let history_len = rt.block_on(async {
            let store = Arc::new(InMemoryStore::new());
            let range = OperandRange::new(0, 10);
            for track in Track::ALL {
                store.load_level(track, 10, 5, range, range);
            }
            let node = store.load_level(Track::Addition, 20, 5, range, range);
            let service = PlacementService::new(store.clone(), store.clone(), store.clone());
            let session = store.open_session(LearnerId(1));

            for &pass in &outcomes {
                let outcome = if pass { Outcome::Pass } else { Outcome::Fail };
                store.record_event(session.id, Track::Addition, outcome, node.id);
            }

            let positions = service
                .positions_for_learner(LearnerId(1))
                .await
                .expect("positions");
            assert_eq!(positions.len(), Track::ALL.len());

            store
                .history(LearnerId(1), Track::Addition)
                .await
                .expect("history")
                .len()
        });

        prop_assert_eq!(history_len, 1);
    }
}
