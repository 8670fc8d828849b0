//! Round: one generation of pairings and their results.

use crate::models::game::GameMatch;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Open while any match lacks a winner; Completed once all are decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Open,
    Completed,
}

/// A round of the tournament. `number` is 1-based and equals its position in history.
///
/// Completion is always derived from the matches. The document carries a
/// `completed` field for readers, but it is written from the matches on
/// serialization and ignored on deserialization.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Round {
    pub number: u32,
    pub matches: Vec<GameMatch>,
}

impl Round {
    pub fn new(number: u32, matches: Vec<GameMatch>) -> Self {
        Self { number, matches }
    }

    pub fn is_completed(&self) -> bool {
        self.matches.iter().all(GameMatch::is_decided)
    }

    pub fn state(&self) -> RoundState {
        if self.is_completed() {
            RoundState::Completed
        } else {
            RoundState::Open
        }
    }

    /// Matches still waiting for a winner.
    pub fn pending_matches(&self) -> usize {
        self.matches.iter().filter(|m| !m.is_decided()).count()
    }
}

impl Serialize for Round {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Round", 3)?;
        s.serialize_field("number", &self.number)?;
        s.serialize_field("matches", &self.matches)?;
        s.serialize_field("completed", &self.is_completed())?;
        s.end()
    }
}
