//! Ordered background writer for one tournament.
//!
//! Callers enqueue persist requests and return immediately. The writer applies
//! them in order and records the last successfully persisted snapshot next to
//! the caller's local one. Failures are logged and recorded, never rolled back.
//!
//! Each request carries the revision it was computed from. Once a write fails,
//! later requests no longer chain onto what the store holds and are held back
//! until the session adopts a snapshot from the store, which also starts a new
//! epoch and discards everything queued before it.

use super::{PersistenceGateway, ReplaceFields, ReplaceRequest};
use crate::models::{PersistenceError, Tournament};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};

/// How the local snapshot relates to what the store last accepted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyncStatus {
    /// Local and last persisted snapshot are at the same revision.
    Synced,
    /// Writes are queued or in flight.
    Pending,
    /// The last write failed; local state may differ from the store.
    Failed(PersistenceError),
}

/// Last persisted snapshot, the committed snapshots not yet confirmed and the
/// most recent write failure.
#[derive(Debug)]
pub(crate) struct SyncTracker {
    last_persisted: Tournament,
    unconfirmed: VecDeque<Tournament>,
    last_error: Option<PersistenceError>,
    epoch: u64,
}

impl SyncTracker {
    pub(crate) fn new(persisted: Tournament) -> Self {
        Self {
            last_persisted: persisted,
            unconfirmed: VecDeque::new(),
            last_error: None,
            epoch: 0,
        }
    }

    pub(crate) fn last_persisted(&self) -> &Tournament {
        &self.last_persisted
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Remember a locally committed snapshot until the store confirms it.
    pub(crate) fn record_commit(&mut self, snapshot: Tournament) -> u64 {
        self.unconfirmed.push_back(snapshot);
        self.epoch
    }

    pub(crate) fn record_success(&mut self, epoch: u64, snapshot: Tournament) {
        if epoch != self.epoch {
            return;
        }
        while self
            .unconfirmed
            .front()
            .is_some_and(|s| s.revision <= snapshot.revision)
        {
            self.unconfirmed.pop_front();
        }
        self.last_persisted = snapshot;
        self.last_error = None;
    }

    pub(crate) fn record_failure(&mut self, epoch: u64, error: PersistenceError) {
        if epoch == self.epoch {
            self.last_error = Some(error);
        }
    }

    /// Whether a snapshot pushed by the store should replace the local one.
    ///
    /// Snapshots older than the last persisted revision are skipped. Without
    /// a recorded failure, echoes of this session's own writes are skipped
    /// too. After a failure the store's state is always taken.
    pub(crate) fn should_adopt(&self, remote: &Tournament) -> bool {
        if remote.id != self.last_persisted.id
            || remote.revision < self.last_persisted.revision
        {
            return false;
        }
        if self.last_error.is_some() {
            return true;
        }
        let echo = std::iter::once(&self.last_persisted)
            .chain(self.unconfirmed.iter())
            .any(|own| same_state(own, remote));
        !echo
    }

    /// Take the store's snapshot as the new baseline and drop queued writes.
    pub(crate) fn adopt(&mut self, remote: Tournament) {
        self.last_persisted = remote;
        self.unconfirmed.clear();
        self.last_error = None;
        self.epoch += 1;
    }

    pub(crate) fn status(&self, local_revision: u64) -> SyncStatus {
        if let Some(error) = &self.last_error {
            SyncStatus::Failed(error.clone())
        } else if self.last_persisted.revision == local_revision {
            SyncStatus::Synced
        } else {
            SyncStatus::Pending
        }
    }
}

/// Same revision and same replaceable fields.
fn same_state(a: &Tournament, b: &Tournament) -> bool {
    a.revision == b.revision
        && a.current_round_number == b.current_round_number
        && a.lifecycle_state == b.lifecycle_state
        && a.history == b.history
}

/// A write for the queue: the fields to send, the revision they were computed
/// from and the local snapshot they produced.
#[derive(Debug)]
pub(crate) struct PersistRequest {
    pub(crate) epoch: u64,
    pub(crate) base_revision: u64,
    pub(crate) fields: ReplaceFields,
    pub(crate) snapshot: Tournament,
}

enum WriterMessage {
    Persist(PersistRequest),
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task. Dropping it lets the task drain and exit.
pub(crate) struct PersistWriter {
    sender: mpsc::UnboundedSender<WriterMessage>,
}

impl PersistWriter {
    /// Spawn the writer task. Must be called from within a Tokio runtime.
    pub(crate) fn spawn(
        gateway: Arc<dyn PersistenceGateway>,
        tracker: Arc<Mutex<SyncTracker>>,
    ) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        tokio::spawn(run(inbox, gateway, tracker));
        Self { sender }
    }

    pub(crate) fn submit(&self, request: PersistRequest) -> Result<(), PersistenceError> {
        self.sender
            .send(WriterMessage::Persist(request))
            .map_err(|_| PersistenceError::WriterClosed)
    }

    /// Wait until every request submitted so far has been attempted.
    pub(crate) async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(WriterMessage::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn run(
    mut inbox: mpsc::UnboundedReceiver<WriterMessage>,
    gateway: Arc<dyn PersistenceGateway>,
    tracker: Arc<Mutex<SyncTracker>>,
) {
    while let Some(message) = inbox.recv().await {
        match message {
            WriterMessage::Persist(request) => persist(gateway.as_ref(), &tracker, request).await,
            WriterMessage::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

async fn persist(
    gateway: &dyn PersistenceGateway,
    tracker: &Mutex<SyncTracker>,
    request: PersistRequest,
) {
    let id = request.snapshot.id;
    {
        let t = lock(tracker);
        if request.epoch != t.epoch() {
            log::debug!(
                "Tournament {}: dropping write at revision {} superseded by a store snapshot",
                id,
                request.snapshot.revision
            );
            return;
        }
        if request.base_revision != t.last_persisted().revision {
            log::warn!(
                "Tournament {}: holding back write at revision {}, store is at {}",
                id,
                request.snapshot.revision,
                t.last_persisted().revision
            );
            return;
        }
    }

    let replace = ReplaceRequest {
        base_revision: request.base_revision,
        revision: request.snapshot.revision,
        fields: request.fields,
    };
    match gateway.replace(id, replace).await {
        Ok(()) => lock(tracker).record_success(request.epoch, request.snapshot),
        Err(e) => {
            log::error!("Failed to persist tournament {}: {}", id, e);
            lock(tracker).record_failure(request.epoch, e);
        }
    }
}

pub(crate) fn lock(tracker: &Mutex<SyncTracker>) -> std::sync::MutexGuard<'_, SyncTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}
