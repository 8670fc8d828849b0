//! Match (game) between two players, or a bye.

use serde::{Deserialize, Serialize};

/// Players are identified by their display name only; two players with the
/// same name cannot be told apart.
pub type PlayerName = String;

/// A single 1v1 match. `player2 == None` is a bye, decided at creation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub player1: PlayerName,
    /// None for a bye.
    pub player2: Option<PlayerName>,
    /// None if not yet played.
    pub winner: Option<PlayerName>,
}

impl GameMatch {
    pub fn new(player1: impl Into<PlayerName>, player2: impl Into<PlayerName>) -> Self {
        Self {
            player1: player1.into(),
            player2: Some(player2.into()),
            winner: None,
        }
    }

    /// A bye: the lone player is credited the win immediately.
    pub fn bye(player: impl Into<PlayerName>) -> Self {
        let player = player.into();
        Self {
            winner: Some(player.clone()),
            player1: player,
            player2: None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// True if `name` is player1 or player2.
    pub fn involves(&self, name: &str) -> bool {
        self.player1 == name || self.player2.as_deref() == Some(name)
    }

    /// The non-winning participant of a decided two-player match. Byes have no loser.
    pub fn loser(&self) -> Option<&str> {
        let winner = self.winner.as_deref()?;
        let player2 = self.player2.as_deref()?;
        if winner == self.player1 {
            Some(player2)
        } else {
            Some(&self.player1)
        }
    }
}
