//! Tournament draft: what staff fill in before a tournament exists.

use crate::models::error::ValidationError;
use crate::models::game::PlayerName;
use serde::{Deserialize, Serialize};

const DEFAULT_TOTAL_ROUNDS: u32 = 3;
const DEFAULT_ROUND_MINUTES: u32 = 50;

/// Creation input. Validated by the coordinator; nothing is created until it passes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TournamentDraft {
    /// Trading-card game the tournament belongs to.
    pub game: String,
    pub name: String,
    pub entry_fee: f64,
    pub prize: String,
    pub roster: Vec<PlayerName>,
    pub total_rounds: u32,
    pub round_duration_minutes: u32,
}

impl Default for TournamentDraft {
    fn default() -> Self {
        Self {
            game: String::new(),
            name: String::new(),
            entry_fee: 0.0,
            prize: String::new(),
            roster: Vec::new(),
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            round_duration_minutes: DEFAULT_ROUND_MINUTES,
        }
    }
}

impl TournamentDraft {
    pub fn new(game: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            game: game.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a player to the roster. Names are trimmed and must be unique (exact match).
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPlayerName);
        }
        if self.roster.iter().any(|p| p == name) {
            return Err(ValidationError::DuplicatePlayer(name.to_string()));
        }
        self.roster.push(name.to_string());
        Ok(())
    }

    /// Remove a player by name. Returns false if not on the roster.
    pub fn remove_player(&mut self, name: &str) -> bool {
        let before = self.roster.len();
        self.roster.retain(|p| p != name);
        self.roster.len() != before
    }

    /// Check every field; the first failing field is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.roster.len() < 2 {
            return Err(ValidationError::NotEnoughPlayers {
                count: self.roster.len(),
            });
        }
        for (i, name) in self.roster.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyPlayerName);
            }
            if self.roster[..i].contains(name) {
                return Err(ValidationError::DuplicatePlayer(name.clone()));
            }
        }
        if self.total_rounds < 1 {
            return Err(ValidationError::InvalidTotalRounds);
        }
        if self.round_duration_minutes < 1 {
            return Err(ValidationError::InvalidRoundDuration);
        }
        if !self.entry_fee.is_finite() || self.entry_fee < 0.0 {
            return Err(ValidationError::InvalidEntryFee(self.entry_fee));
        }
        Ok(())
    }
}
