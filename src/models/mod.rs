//! Data structures for the tournament: matches, rounds, drafts, the tournament document and errors.

mod draft;
mod error;
mod game;
mod round;
mod tournament;

pub use draft::TournamentDraft;
pub use error::{
    DraftField, OperationRejected, PersistenceError, TournamentError, TournamentResult,
    ValidationError,
};
pub use game::{GameMatch, PlayerName};
pub use round::{Round, RoundState};
pub use tournament::{LifecycleState, Tournament, TournamentId};
