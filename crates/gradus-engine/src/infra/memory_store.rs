//! In-memory storage implementation
//!
//! Backs all three storage ports with concurrent maps. This is the store
//! used by tests and single-process deployments; it honors the same
//! contracts a database-backed implementation would, including the
//! conditional checkpoint append and the session join on event reads.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use gradus_common::{
    Checkpoint, CheckpointId, EventId, GradusError, LearnerId, LevelNeighbors, LevelNode,
    LevelNodeId, NewCheckpoint, OperandRange, Outcome, PracticeEvent, PracticeSession, Result,
    SessionId, Track,
};

use crate::infra::store::{CheckpointStore, EventStore, LevelGraph};

/// In-memory store for curriculum, sessions, events, and checkpoints
pub struct InMemoryStore {
    /// Curriculum nodes by id
    levels: DashMap<LevelNodeId, LevelNode>,

    /// Practice sessions by id; the join point for event ownership
    sessions: DashMap<SessionId, PracticeSession>,

    /// Append-only practice-event log, ascending by id
    events: RwLock<Vec<PracticeEvent>>,

    /// Checkpoint history per (learner, track), ascending by id
    checkpoints: DashMap<(LearnerId, Track), Vec<Checkpoint>>,

    next_level_id: AtomicU64,
    next_session_id: AtomicU64,
    next_event_id: AtomicU64,
    next_checkpoint_id: AtomicU64,

    /// Remaining event reads to fail with `StoreUnavailable`
    fail_reads: AtomicUsize,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            levels: DashMap::new(),
            sessions: DashMap::new(),
            events: RwLock::new(Vec::new()),
            checkpoints: DashMap::new(),
            next_level_id: AtomicU64::new(1),
            next_session_id: AtomicU64::new(1),
            next_event_id: AtomicU64::new(1),
            next_checkpoint_id: AtomicU64::new(1),
            fail_reads: AtomicUsize::new(0),
        }
    }

    /// Provision a curriculum node, as curriculum authoring would
    pub fn load_level(
        &self,
        track: Track,
        level_number: i32,
        criterion: i32,
        operand_one: OperandRange,
        operand_two: OperandRange,
    ) -> LevelNode {
        let id = LevelNodeId(self.next_level_id.fetch_add(1, Ordering::Relaxed));
        let node = LevelNode::new(id, track, level_number, criterion, operand_one, operand_two);
        self.levels.insert(id, node.clone());
        node
    }

    /// Drop a curriculum node (simulates a curriculum re-provisioning that
    /// leaves checkpoints dangling)
    pub fn remove_level(&self, id: LevelNodeId) -> Option<LevelNode> {
        self.levels.remove(&id).map(|(_, node)| node)
    }

    /// Open a practice session for a learner, as the ingestion path would
    pub fn open_session(&self, learner_id: LearnerId) -> PracticeSession {
        let id = SessionId(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        let session = PracticeSession {
            id,
            learner_id,
            started_at: Utc::now(),
        };
        self.sessions.insert(id, session.clone());
        session
    }

    /// Record one answered exercise, as the ingestion path would
    pub fn record_event(
        &self,
        session_id: SessionId,
        track: Track,
        outcome: Outcome,
        level_node_id: LevelNodeId,
    ) -> PracticeEvent {
        // Id assignment and push stay under one lock so the log is
        // ascending by id.
        let mut log = self.events.write();
        let id = EventId(self.next_event_id.fetch_add(1, Ordering::Relaxed));
        let event = PracticeEvent {
            id,
            session_id,
            track,
            outcome,
            level_node_id,
        };
        log.push(event.clone());
        event
    }

    /// Make the next `n` event reads fail with `StoreUnavailable`
    pub fn fail_next_reads(&self, n: usize) {
        self.fail_reads.store(n, Ordering::SeqCst);
    }

    fn take_read_fault(&self) -> bool {
        self.fail_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LevelGraph for InMemoryStore {
    async fn initial_level(&self, track: Track) -> Result<LevelNode> {
        self.levels
            .iter()
            .filter(|node| node.track == track)
            .min_by_key(|node| (node.level_number, node.id))
            .map(|node| node.clone())
            .ok_or(GradusError::NoLevelsConfigured { track })
    }

    async fn resolve(&self, id: LevelNodeId) -> Result<LevelNode> {
        self.levels
            .get(&id)
            .map(|node| node.clone())
            .ok_or(GradusError::DanglingLevelReference { level_node_id: id })
    }

    async fn neighbors(&self, node: &LevelNode) -> Result<LevelNeighbors> {
        let mut prev: Option<LevelNode> = None;
        let mut next: Option<LevelNode> = None;

        for candidate in self.levels.iter() {
            if candidate.track != node.track || candidate.id == node.id {
                continue;
            }
            if candidate.level_number < node.level_number {
                let closer = prev
                    .as_ref()
                    .map_or(true, |p| (candidate.level_number, candidate.id) > (p.level_number, p.id));
                if closer {
                    prev = Some(candidate.clone());
                }
            } else if candidate.level_number > node.level_number {
                let closer = next
                    .as_ref()
                    .map_or(true, |n| (candidate.level_number, candidate.id) < (n.level_number, n.id));
                if closer {
                    next = Some(candidate.clone());
                }
            }
        }

        Ok(LevelNeighbors {
            prev,
            current: node.clone(),
            next,
        })
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn events_since(
        &self,
        learner_id: LearnerId,
        track: Track,
        after: Option<EventId>,
    ) -> Result<Vec<PracticeEvent>> {
        if self.take_read_fault() {
            return Err(GradusError::StoreUnavailable(
                "injected event-read failure".to_string(),
            ));
        }

        let log = self.events.read();
        let rows = log
            .iter()
            .filter(|event| after.map_or(true, |watermark| event.id > watermark))
            .filter(|event| event.track == track)
            .filter(|event| {
                // Ownership resolves through the event's session.
                self.sessions
                    .get(&event.session_id)
                    .map(|session| session.learner_id)
                    == Some(learner_id)
            })
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn session_learners(
        &self,
        session_ids: &[SessionId],
    ) -> Result<BTreeMap<SessionId, LearnerId>> {
        let mut map = BTreeMap::new();
        for id in session_ids {
            if let Some(session) = self.sessions.get(id) {
                map.insert(*id, session.learner_id);
            }
        }
        Ok(map)
    }
}

#[async_trait]
impl CheckpointStore for InMemoryStore {
    async fn latest(&self, learner_id: LearnerId, track: Track) -> Result<Option<Checkpoint>> {
        Ok(self
            .checkpoints
            .get(&(learner_id, track))
            .and_then(|rows| rows.last().cloned()))
    }

    async fn append(
        &self,
        checkpoint: NewCheckpoint,
        expected_latest: Option<CheckpointId>,
    ) -> Result<Checkpoint> {
        let key = (checkpoint.learner_id, checkpoint.track);

        // The entry guard serializes the compare-and-append per key.
        let mut rows = self.checkpoints.entry(key).or_default();
        if rows.last().map(|c| c.id) != expected_latest {
            return Err(GradusError::ConcurrentCheckpointConflict {
                learner_id: checkpoint.learner_id,
                track: checkpoint.track,
            });
        }

        let row = Checkpoint {
            id: CheckpointId(self.next_checkpoint_id.fetch_add(1, Ordering::Relaxed)),
            learner_id: checkpoint.learner_id,
            track: checkpoint.track,
            level_node_id: checkpoint.level_node_id,
            created_at: Utc::now(),
            success_ratio: checkpoint.success_ratio,
            verdict: checkpoint.verdict,
            watermark: checkpoint.watermark,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn history(&self, learner_id: LearnerId, track: Track) -> Result<Vec<Checkpoint>> {
        Ok(self
            .checkpoints
            .get(&(learner_id, track))
            .map(|rows| rows.clone())
            .unwrap_or_default())
    }
}
