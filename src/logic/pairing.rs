//! Pairing generation: one round's matches from the full roster.

use crate::models::{GameMatch, PlayerName, TournamentError, TournamentResult};
use rand::seq::SliceRandom;
use rand::Rng;

/// Generate the matches for one round.
///
/// 1. Shuffle the whole roster (Fisher-Yates, driven by `rng`).
/// 2. Pair consecutive players.
/// 3. With an odd roster the last player gets a bye, already won.
///
/// Every round reshuffles the original roster. Earlier results play no part,
/// so rematches are possible and nothing is seeded by standings.
pub fn generate_pairings<R: Rng + ?Sized>(
    roster: &[PlayerName],
    rng: &mut R,
) -> TournamentResult<Vec<GameMatch>> {
    if roster.len() < 2 {
        return Err(TournamentError::InvalidRoster { len: roster.len() });
    }

    let mut shuffled = roster.to_vec();
    shuffled.shuffle(rng);

    let matches = shuffled
        .chunks(2)
        .map(|pair| match pair.get(1) {
            Some(player2) => GameMatch::new(pair[0].clone(), player2.clone()),
            None => GameMatch::bye(pair[0].clone()),
        })
        .collect();

    Ok(matches)
}
