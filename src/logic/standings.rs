//! Standings: ranked win/loss/winrate table derived from match history.

use crate::models::{PlayerName, Tournament};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Podium medal, only handed out once the tournament is finished.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            0 => Some(Medal::Gold),
            1 => Some(Medal::Silver),
            2 => Some(Medal::Bronze),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Medal::Gold => "gold",
            Medal::Silver => "silver",
            Medal::Bronze => "bronze",
        }
    }
}

/// One row of the standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerName,
    pub wins: u32,
    pub losses: u32,
    /// Percentage of decided matches won, rounded; 0 with no decided matches.
    pub winrate: u32,
    pub medal: Option<Medal>,
}

/// Compute standings from the full history.
///
/// Sorted by wins, then winrate, both descending. The sort is stable, so
/// remaining ties keep roster order. With no rounds played the table is empty.
pub fn compute_standings(tournament: &Tournament) -> Vec<Standing> {
    if tournament.history.is_empty() {
        return Vec::new();
    }

    let mut tally: HashMap<&str, (u32, u32)> = tournament
        .roster
        .iter()
        .map(|p| (p.as_str(), (0, 0)))
        .collect();

    for game in tournament.history.iter().flat_map(|r| r.matches.iter()) {
        let Some(winner) = game.winner.as_deref() else {
            continue;
        };
        if let Some((wins, _)) = tally.get_mut(winner) {
            *wins += 1;
        }
        if let Some((_, losses)) = game.loser().and_then(|l| tally.get_mut(l)) {
            *losses += 1;
        }
    }

    let mut table: Vec<Standing> = tournament
        .roster
        .iter()
        .map(|player| {
            let (wins, losses) = tally.get(player.as_str()).copied().unwrap_or_default();
            Standing {
                player: player.clone(),
                wins,
                losses,
                winrate: winrate(wins, losses),
                medal: None,
            }
        })
        .collect();

    table.sort_by(|a, b| b.wins.cmp(&a.wins).then(b.winrate.cmp(&a.winrate)));

    if tournament.is_finished() {
        for (rank, row) in table.iter_mut().enumerate() {
            row.medal = Medal::for_rank(rank);
        }
    }
    table
}

/// `round(wins / (wins + losses) * 100)`, or 0 with no decided matches.
pub fn winrate(wins: u32, losses: u32) -> u32 {
    let total = wins + losses;
    if total == 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(total) * 100.0).round() as u32
}

#[derive(Serialize)]
struct StandingRow<'a> {
    rank: usize,
    player: &'a str,
    wins: u32,
    losses: u32,
    winrate: u32,
    medal: &'static str,
}

/// Render standings as CSV with a header row.
pub fn standings_to_csv(standings: &[Standing]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (idx, row) in standings.iter().enumerate() {
        writer.serialize(StandingRow {
            rank: idx + 1,
            player: &row.player,
            wins: row.wins,
            losses: row.losses,
            winrate: row.winrate,
            medal: row.medal.map(|m| m.as_str()).unwrap_or(""),
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
