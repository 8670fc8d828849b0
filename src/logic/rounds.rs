//! Round state machine: recording results and gating advancement.

use crate::models::{OperationRejected, RoundState, Tournament};

/// Record `winner` for match `match_index` of round `round_number`.
///
/// Only the current round of an Active tournament is editable. A decided
/// match may be corrected to the other participant; completion is derived
/// from the matches, so a completed round stays completed.
pub fn record_result(
    tournament: &mut Tournament,
    round_number: u32,
    match_index: usize,
    winner: &str,
) -> Result<RoundState, OperationRejected> {
    if !tournament.is_active() {
        return Err(OperationRejected::NotActive);
    }
    let current = tournament.current_round_number;
    if round_number != current {
        return Err(OperationRejected::RoundLocked {
            round: round_number,
            current,
        });
    }
    let round = tournament
        .current_round_mut()
        .ok_or(OperationRejected::RoundLocked {
            round: round_number,
            current,
        })?;
    let game = round
        .matches
        .get_mut(match_index)
        .ok_or(OperationRejected::MatchNotFound {
            round: round_number,
            match_index,
        })?;
    if game.is_bye() {
        return Err(OperationRejected::ByeAlreadyResolved { match_index });
    }
    if !game.involves(winner) {
        return Err(OperationRejected::WinnerNotParticipant {
            winner: winner.to_string(),
        });
    }

    game.winner = Some(winner.to_string());
    Ok(round.state())
}

/// Fails unless every match of the current round has a winner.
pub fn ensure_round_completed(tournament: &Tournament) -> Result<(), OperationRejected> {
    let round = tournament
        .current_round()
        .ok_or(OperationRejected::NotActive)?;
    match round.pending_matches() {
        0 => Ok(()),
        pending => Err(OperationRejected::RoundIncomplete {
            round: round.number,
            pending,
        }),
    }
}
