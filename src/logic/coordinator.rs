//! Tournament lifecycle coordinator: owns the session's authoritative snapshot.
//!
//! Every user intent enters here, is validated against the local snapshot,
//! mutates it synchronously and then queues a whole-field persist request.
//! The caller never waits for the store.

use crate::logic::countdown::{RoundCountdown, TimeUpNotifier};
use crate::logic::pairing::generate_pairings;
use crate::logic::rounds::{ensure_round_completed, record_result};
use crate::logic::standings::{compute_standings, Standing};
use crate::logic::timer::TimerSnapshot;
use crate::models::{
    GameMatch, LifecycleState, OperationRejected, Round, RoundState, Tournament, TournamentDraft,
    TournamentId, TournamentResult,
};
use crate::persistence::{
    lock_tracker, PersistRequest, PersistWriter, PersistenceGateway, ReplaceFields, SyncStatus,
    SyncTracker,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Result of a successful `advance`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AdvanceOutcome {
    /// A new round was paired.
    NextRound { round: u32 },
    /// The last round was completed; final standings with medals.
    Finished { standings: Vec<Standing> },
}

/// What the round screen shows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentRoundView {
    pub number: u32,
    pub total_rounds: u32,
    pub matches: Vec<GameMatch>,
    pub completed: bool,
    pub pending_matches: usize,
    /// Advancing from here finishes the tournament.
    pub finishes_tournament: bool,
    pub lifecycle_state: LifecycleState,
}

pub struct TournamentCoordinator {
    snapshot: Tournament,
    writer: PersistWriter,
    tracker: Arc<Mutex<SyncTracker>>,
    rng: Box<dyn RngCore + Send + Sync>,
    countdown: RoundCountdown,
}

impl TournamentCoordinator {
    /// Validate the draft, pair round 1 and store the new tournament.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn create(
        draft: TournamentDraft,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> TournamentResult<Self> {
        Self::create_with_rng(draft, gateway, Box::new(StdRng::from_entropy())).await
    }

    /// As [`create`](Self::create), with an explicit random source for pairings.
    pub async fn create_with_rng(
        draft: TournamentDraft,
        gateway: Arc<dyn PersistenceGateway>,
        mut rng: Box<dyn RngCore + Send + Sync>,
    ) -> TournamentResult<Self> {
        if let Err(e) = draft.validate() {
            log::warn!("Rejected tournament draft ({}): {}", e.field(), e);
            return Err(e.into());
        }
        let first_round = Round::new(1, generate_pairings(&draft.roster, &mut *rng)?);
        let mut tournament = Tournament::from_draft(draft, first_round);

        let id = gateway.create(&tournament).await.map_err(|e| {
            log::error!("Failed to create tournament '{}': {}", tournament.name, e);
            e
        })?;
        tournament.id = id;
        log::info!(
            "Created tournament {} '{}' ({} players, {} rounds)",
            tournament.id,
            tournament.name,
            tournament.roster.len(),
            tournament.total_rounds
        );
        Ok(Self::with_rng(tournament, gateway, rng))
    }

    /// Open a session on a tournament already in the store.
    pub fn attach(snapshot: Tournament, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self::with_rng(snapshot, gateway, Box::new(StdRng::from_entropy()))
    }

    /// As [`attach`](Self::attach), with an explicit random source for pairings.
    pub fn with_rng(
        snapshot: Tournament,
        gateway: Arc<dyn PersistenceGateway>,
        rng: Box<dyn RngCore + Send + Sync>,
    ) -> Self {
        let tracker = Arc::new(Mutex::new(SyncTracker::new(snapshot.clone())));
        let writer = PersistWriter::spawn(gateway, Arc::clone(&tracker));
        let countdown = RoundCountdown::new(
            snapshot.current_round_number,
            snapshot.round_duration_seconds(),
        );
        Self {
            snapshot,
            writer,
            tracker,
            rng,
            countdown,
        }
    }

    /// Called once whenever a round's countdown reaches zero.
    pub fn set_time_up_notifier(&mut self, notifier: TimeUpNotifier) {
        self.countdown.set_notifier(notifier);
    }

    pub fn id(&self) -> TournamentId {
        self.snapshot.id
    }

    pub fn snapshot(&self) -> &Tournament {
        &self.snapshot
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.snapshot.lifecycle_state
    }

    /// Record a match result in the current round, then persist the whole history.
    pub fn record_result(
        &mut self,
        round_number: u32,
        match_index: usize,
        winner: &str,
    ) -> TournamentResult<RoundState> {
        let state = record_result(&mut self.snapshot, round_number, match_index, winner)
            .map_err(|e| {
                log::warn!("Tournament {}: result rejected: {}", self.snapshot.id, e);
                e
            })?;
        self.commit(self.progress_fields());
        Ok(state)
    }

    /// Move past the current round once it is completed.
    ///
    /// From the last round this finishes the tournament and returns the final
    /// standings. Otherwise the full original roster is paired again.
    pub fn advance(&mut self) -> TournamentResult<AdvanceOutcome> {
        if let Err(e) = self.check_can_advance() {
            log::warn!("Tournament {}: advance rejected: {}", self.snapshot.id, e);
            return Err(e.into());
        }

        if self.snapshot.is_last_round() {
            self.snapshot.lifecycle_state = LifecycleState::Finished;
            self.commit(ReplaceFields::Lifecycle {
                lifecycle_state: LifecycleState::Finished,
            });
            self.countdown.reset();
            log::info!(
                "Tournament {} finished after {} round(s)",
                self.snapshot.id,
                self.snapshot.current_round_number
            );
            return Ok(AdvanceOutcome::Finished {
                standings: compute_standings(&self.snapshot),
            });
        }

        let matches = generate_pairings(&self.snapshot.roster, &mut *self.rng)?;
        let next = self.snapshot.current_round_number + 1;
        self.snapshot.history.push(Round::new(next, matches));
        self.snapshot.current_round_number = next;
        self.commit(self.progress_fields());
        self.countdown
            .restart_for_round(next, self.snapshot.round_duration_seconds());
        log::info!(
            "Tournament {}: round {}/{} paired",
            self.snapshot.id,
            next,
            self.snapshot.total_rounds
        );
        Ok(AdvanceOutcome::NextRound { round: next })
    }

    pub fn start_timer(&mut self) {
        self.countdown.start();
    }

    pub fn pause_timer(&mut self) {
        self.countdown.pause();
    }

    pub fn reset_timer(&mut self) {
        self.countdown.reset();
    }

    pub fn timer_view(&self) -> TimerSnapshot {
        self.countdown.snapshot()
    }

    /// Time ran out but the current round still has undecided matches.
    pub fn time_up_with_pending_results(&self) -> bool {
        self.countdown.is_finished()
            && self
                .snapshot
                .current_round()
                .is_some_and(|r| !r.is_completed())
    }

    pub fn current_round_view(&self) -> Option<CurrentRoundView> {
        let round = self.snapshot.current_round()?;
        Some(CurrentRoundView {
            number: round.number,
            total_rounds: self.snapshot.total_rounds,
            matches: round.matches.clone(),
            completed: round.is_completed(),
            pending_matches: round.pending_matches(),
            finishes_tournament: self.snapshot.is_last_round(),
            lifecycle_state: self.snapshot.lifecycle_state,
        })
    }

    pub fn standings_view(&self) -> Vec<Standing> {
        compute_standings(&self.snapshot)
    }

    pub fn sync_status(&self) -> SyncStatus {
        lock_tracker(&self.tracker).status(self.snapshot.revision)
    }

    /// The snapshot the store last accepted from this session.
    pub fn last_persisted(&self) -> Tournament {
        lock_tracker(&self.tracker).last_persisted().clone()
    }

    /// Wait for queued persist requests to be attempted.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Replace the local snapshot with one pushed by the store.
    ///
    /// Echoes of this session's own writes and snapshots older than the last
    /// persisted revision are skipped. Anything else from the store wins:
    /// the local snapshot is replaced and writes still queued are dropped.
    /// Returns whether the snapshot was applied.
    pub fn apply_remote_snapshot(&mut self, remote: Tournament) -> bool {
        let mut tracker = lock_tracker(&self.tracker);
        if !tracker.should_adopt(&remote) {
            return false;
        }
        log::debug!(
            "Tournament {}: applying remote snapshot at revision {} over local revision {}",
            remote.id,
            remote.revision,
            self.snapshot.revision
        );
        tracker.adopt(remote.clone());
        drop(tracker);

        if remote.current_round_number != self.snapshot.current_round_number
            || remote.lifecycle_state != self.snapshot.lifecycle_state
        {
            self.countdown
                .restart_for_round(remote.current_round_number, remote.round_duration_seconds());
        }
        self.snapshot = remote;
        true
    }

    fn check_can_advance(&self) -> Result<(), OperationRejected> {
        if !self.snapshot.is_active() {
            return Err(OperationRejected::NotActive);
        }
        ensure_round_completed(&self.snapshot)
    }

    fn progress_fields(&self) -> ReplaceFields {
        ReplaceFields::Progress {
            history: self.snapshot.history.clone(),
            current_round_number: self.snapshot.current_round_number,
        }
    }

    /// Bump the local revision and queue the write.
    fn commit(&mut self, fields: ReplaceFields) {
        let base_revision = self.snapshot.revision;
        self.snapshot.revision += 1;
        let epoch = lock_tracker(&self.tracker).record_commit(self.snapshot.clone());
        let request = PersistRequest {
            epoch,
            base_revision,
            fields,
            snapshot: self.snapshot.clone(),
        };
        if let Err(e) = self.writer.submit(request) {
            log::error!("Tournament {}: {}", self.snapshot.id, e);
            lock_tracker(&self.tracker).record_failure(epoch, e);
        }
    }
}
