//! Persistence gateway: the document store seam the coordinator writes through.
//!
//! Writes are whole-field overwrites guarded by a revision check; readers
//! subscribe to full document snapshots.

mod memory;
mod writer;

pub use memory::InMemoryGateway;
pub use writer::SyncStatus;
pub(crate) use writer::{lock as lock_tracker, PersistRequest, PersistWriter, SyncTracker};

use crate::models::{LifecycleState, PersistenceError, Round, Tournament, TournamentId};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Field set replaced by one write. Never merged: each field is overwritten whole.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplaceFields {
    /// `{history, currentRoundNumber}`
    Progress {
        history: Vec<Round>,
        current_round_number: u32,
    },
    /// `{lifecycleState}`
    Lifecycle { lifecycle_state: LifecycleState },
}

impl ReplaceFields {
    pub fn apply_to(self, document: &mut Tournament) {
        match self {
            ReplaceFields::Progress {
                history,
                current_round_number,
            } => {
                document.history = history;
                document.current_round_number = current_round_number;
            }
            ReplaceFields::Lifecycle { lifecycle_state } => {
                document.lifecycle_state = lifecycle_state;
            }
        }
    }
}

/// One guarded write: applies only if the stored revision equals `base_revision`,
/// after which the stored revision becomes `revision`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplaceRequest {
    pub base_revision: u64,
    pub revision: u64,
    pub fields: ReplaceFields,
}

/// Which documents a subscriber or listing wants.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TournamentFilter {
    /// Only tournaments of this game; None for all.
    pub game: Option<String>,
}

impl TournamentFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_game(game: impl Into<String>) -> Self {
        Self {
            game: Some(game.into()),
        }
    }

    pub fn matches(&self, tournament: &Tournament) -> bool {
        self.game.as_deref().map_or(true, |g| tournament.game == g)
    }
}

/// Push-based stream of full document snapshots matching a filter.
pub struct SnapshotSubscription {
    receiver: broadcast::Receiver<Tournament>,
    filter: TournamentFilter,
}

impl SnapshotSubscription {
    pub fn new(receiver: broadcast::Receiver<Tournament>, filter: TournamentFilter) -> Self {
        Self { receiver, filter }
    }

    /// Next matching snapshot; None once the store is gone.
    pub async fn next(&mut self) -> Option<Tournament> {
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) if self.filter.matches(&snapshot) => return Some(snapshot),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Snapshot subscriber lagged, skipped {} update(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Document store for tournaments.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Store a new document and return its id. The document's own `id` is ignored.
    async fn create(&self, document: &Tournament) -> Result<TournamentId, PersistenceError>;

    /// Overwrite the given fields if the revision check passes.
    async fn replace(
        &self,
        id: TournamentId,
        request: ReplaceRequest,
    ) -> Result<(), PersistenceError>;

    async fn fetch(&self, id: TournamentId) -> Result<Tournament, PersistenceError>;

    /// Matching documents, most advanced round first.
    async fn list(&self, filter: &TournamentFilter) -> Result<Vec<Tournament>, PersistenceError>;

    /// Operator action; the engine never calls this itself.
    async fn delete(&self, id: TournamentId) -> Result<(), PersistenceError>;

    fn subscribe(&self, filter: TournamentFilter) -> SnapshotSubscription;
}
