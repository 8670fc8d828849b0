//! Tournament document and LifecycleState.

use crate::models::draft::TournamentDraft;
use crate::models::game::PlayerName;
use crate::models::round::Round;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament, assigned by the persistence gateway.
pub type TournamentId = Uuid;

/// Top-level phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Draft only; never stored.
    #[default]
    Pending,
    /// Rounds in progress.
    Active,
    /// Terminal; standings frozen.
    Finished,
}

/// Full tournament document, in the shape it is persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    /// Trading-card game this tournament is played in.
    #[serde(default)]
    pub game: String,
    pub name: String,
    pub entry_fee: f64,
    #[serde(default)]
    pub prize: String,
    /// Unique display names; immutable after creation.
    pub roster: Vec<PlayerName>,
    pub total_rounds: u32,
    pub round_duration_minutes: u32,
    pub lifecycle_state: LifecycleState,
    /// 1..=total_rounds while Active; frozen once Finished.
    pub current_round_number: u32,
    /// `history.len() == current_round_number`.
    pub history: Vec<Round>,
    /// Bumped on every local mutation; the store rejects writes based on an old one.
    #[serde(default)]
    pub revision: u64,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Build an Active tournament from a validated draft and its first round.
    /// The id stays nil until the gateway assigns one.
    pub fn from_draft(draft: TournamentDraft, first_round: Round) -> Self {
        Self {
            id: Uuid::nil(),
            game: draft.game.trim().to_string(),
            name: draft.name.trim().to_string(),
            entry_fee: draft.entry_fee,
            prize: draft.prize.trim().to_string(),
            roster: draft.roster,
            total_rounds: draft.total_rounds,
            round_duration_minutes: draft.round_duration_minutes,
            lifecycle_state: LifecycleState::Active,
            current_round_number: 1,
            history: vec![first_round],
            revision: 0,
            created_at: Utc::now(),
        }
    }

    pub fn current_round(&self) -> Option<&Round> {
        let idx = self.current_round_number.checked_sub(1)?;
        self.history.get(idx as usize)
    }

    pub fn current_round_mut(&mut self) -> Option<&mut Round> {
        let idx = self.current_round_number.checked_sub(1)?;
        self.history.get_mut(idx as usize)
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle_state == LifecycleState::Active
    }

    pub fn is_finished(&self) -> bool {
        self.lifecycle_state == LifecycleState::Finished
    }

    /// Advancing from this round finishes the tournament.
    pub fn is_last_round(&self) -> bool {
        self.current_round_number >= self.total_rounds
    }

    /// Number of rounds whose matches are all decided.
    pub fn rounds_played(&self) -> usize {
        self.history.iter().filter(|r| r.is_completed()).count()
    }

    pub fn round_duration_seconds(&self) -> u32 {
        self.round_duration_minutes.saturating_mul(60)
    }
}
