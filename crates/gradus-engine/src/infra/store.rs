//! Storage ports for the progression engine
//!
//! One typed repository trait per persisted entity, resolved at compile
//! time. The engine is written against these ports and receives
//! implementations by constructor injection; [`InMemoryStore`] backs all
//! three for tests and single-process deployments.
//!
//! [`InMemoryStore`]: crate::infra::memory_store::InMemoryStore

use async_trait::async_trait;
use std::collections::BTreeMap;

use gradus_common::{
    Checkpoint, CheckpointId, EventId, LearnerId, LevelNeighbors, LevelNode, LevelNodeId,
    NewCheckpoint, PracticeEvent, Result, SessionId, Track,
};

/// Read-only access to the curriculum's level graph
///
/// Level nodes are provisioned out-of-band by curriculum authoring; the
/// engine never writes them.
#[async_trait]
pub trait LevelGraph: Send + Sync {
    /// Node with the lowest level number for the track.
    ///
    /// Fails with `NoLevelsConfigured` when the track has no nodes.
    async fn initial_level(&self, track: Track) -> Result<LevelNode>;

    /// Resolve a node by id.
    ///
    /// Fails with `DanglingLevelReference` when the node does not exist.
    async fn resolve(&self, id: LevelNodeId) -> Result<LevelNode>;

    /// The nodes adjacent to `node` within its track.
    ///
    /// `prev` is the node with the greatest level number strictly below the
    /// current one, `next` the least strictly above. Either may be absent at
    /// the edges of the track; that is an expected state, not an error.
    async fn neighbors(&self, node: &LevelNode) -> Result<LevelNeighbors>;
}

/// Read-only access to the append-only practice-event log
///
/// Events do not carry a learner id. Implementations resolve ownership
/// through the event's practice session; that join is part of this contract
/// and survives any change of storage layout.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// The learner's events for a track with id strictly greater than
    /// `after`, in ascending id order. `None` means the whole stream.
    async fn events_since(
        &self,
        learner_id: LearnerId,
        track: Track,
        after: Option<EventId>,
    ) -> Result<Vec<PracticeEvent>>;

    /// Resolve a batch of session ids to their owning learners.
    ///
    /// Sessions that do not resolve are omitted from the map.
    async fn session_learners(
        &self,
        session_ids: &[SessionId],
    ) -> Result<BTreeMap<SessionId, LearnerId>>;
}

/// Append-only access to the checkpoint log
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Latest checkpoint for the pair: the row with the greatest id.
    async fn latest(&self, learner_id: LearnerId, track: Track) -> Result<Option<Checkpoint>>;

    /// Append a checkpoint, conditional on the current latest.
    ///
    /// `expected_latest` is the id of the latest checkpoint the caller read
    /// before deciding to append (`None` for "no checkpoint exists yet").
    /// When the store's current latest differs, nothing is appended and
    /// `ConcurrentCheckpointConflict` is returned.
    async fn append(
        &self,
        checkpoint: NewCheckpoint,
        expected_latest: Option<CheckpointId>,
    ) -> Result<Checkpoint>;

    /// Full append-order history for the pair.
    ///
    /// The read-only contract for analytics consumers; never written to by
    /// anything but [`append`](Self::append).
    async fn history(&self, learner_id: LearnerId, track: Track) -> Result<Vec<Checkpoint>>;
}
