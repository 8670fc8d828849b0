//! In-process document store with snapshot broadcast.

use super::{PersistenceGateway, ReplaceRequest, SnapshotSubscription, TournamentFilter};
use crate::models::{PersistenceError, Tournament, TournamentId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 256;

/// Tournaments by id, in memory. Every accepted write is broadcast to subscribers.
pub struct InMemoryGateway {
    documents: RwLock<HashMap<TournamentId, Tournament>>,
    snapshots: broadcast::Sender<Tournament>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            documents: RwLock::new(HashMap::new()),
            snapshots,
        }
    }

    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, snapshot: Tournament) {
        // No receivers is fine.
        let _ = self.snapshots.send(snapshot);
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn create(&self, document: &Tournament) -> Result<TournamentId, PersistenceError> {
        let id = Uuid::new_v4();
        let stored = Tournament {
            id,
            ..document.clone()
        };
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, stored.clone());
        self.publish(stored);
        Ok(id)
    }

    async fn replace(
        &self,
        id: TournamentId,
        request: ReplaceRequest,
    ) -> Result<(), PersistenceError> {
        let snapshot = {
            let mut documents = self
                .documents
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let document = documents
                .get_mut(&id)
                .ok_or(PersistenceError::NotFound(id))?;
            if document.revision != request.base_revision {
                return Err(PersistenceError::StaleRevision {
                    expected: request.base_revision,
                    actual: document.revision,
                });
            }
            request.fields.apply_to(document);
            document.revision = request.revision;
            document.clone()
        };
        self.publish(snapshot);
        Ok(())
    }

    async fn fetch(&self, id: TournamentId) -> Result<Tournament, PersistenceError> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(PersistenceError::NotFound(id))
    }

    async fn list(&self, filter: &TournamentFilter) -> Result<Vec<Tournament>, PersistenceError> {
        let mut found: Vec<Tournament> = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.current_round_number
                .cmp(&a.current_round_number)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(found)
    }

    async fn delete(&self, id: TournamentId) -> Result<(), PersistenceError> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| ())
            .ok_or(PersistenceError::NotFound(id))
    }

    fn subscribe(&self, filter: TournamentFilter) -> SnapshotSubscription {
        SnapshotSubscription::new(self.snapshots.subscribe(), filter)
    }
}
