//! Error taxonomy: draft validation, rejected operations, persistence failures.

use crate::models::tournament::TournamentId;

/// Draft field a [`ValidationError`] refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DraftField {
    Name,
    Roster,
    EntryFee,
    TotalRounds,
    RoundDuration,
}

impl std::fmt::Display for DraftField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DraftField::Name => "name",
            DraftField::Roster => "roster",
            DraftField::EntryFee => "entryFee",
            DraftField::TotalRounds => "totalRounds",
            DraftField::RoundDuration => "roundDurationMinutes",
        };
        f.write_str(name)
    }
}

/// Malformed tournament draft. Raised before any state is created.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// Tournament name is empty after trimming.
    EmptyName,
    /// A player name is empty after trimming.
    EmptyPlayerName,
    /// The same display name appears twice in the roster.
    DuplicatePlayer(String),
    /// Fewer than two players on the roster.
    NotEnoughPlayers { count: usize },
    /// Entry fee is negative or not a finite number.
    InvalidEntryFee(f64),
    /// Total rounds must be at least 1.
    InvalidTotalRounds,
    /// Round duration must be at least 1 minute.
    InvalidRoundDuration,
}

impl ValidationError {
    /// The draft field the user has to correct.
    pub fn field(&self) -> DraftField {
        match self {
            ValidationError::EmptyName => DraftField::Name,
            ValidationError::EmptyPlayerName
            | ValidationError::DuplicatePlayer(_)
            | ValidationError::NotEnoughPlayers { .. } => DraftField::Roster,
            ValidationError::InvalidEntryFee(_) => DraftField::EntryFee,
            ValidationError::InvalidTotalRounds => DraftField::TotalRounds,
            ValidationError::InvalidRoundDuration => DraftField::RoundDuration,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "Tournament name is required"),
            ValidationError::EmptyPlayerName => write!(f, "Player name is required"),
            ValidationError::DuplicatePlayer(name) => {
                write!(f, "Player '{}' is already on the roster", name)
            }
            ValidationError::NotEnoughPlayers { count } => {
                write!(f, "Need at least 2 players (have {})", count)
            }
            ValidationError::InvalidEntryFee(fee) => {
                write!(f, "Entry fee must be a non-negative number (got {})", fee)
            }
            ValidationError::InvalidTotalRounds => write!(f, "Total rounds must be at least 1"),
            ValidationError::InvalidRoundDuration => {
                write!(f, "Round duration must be at least 1 minute")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A user intent whose precondition does not hold. Nothing was mutated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OperationRejected {
    /// The tournament is not in the Active state.
    NotActive,
    /// Only the current round accepts results.
    RoundLocked { round: u32, current: u32 },
    /// No match at this index in the round.
    MatchNotFound { round: u32, match_index: usize },
    /// Bye matches are resolved at creation.
    ByeAlreadyResolved { match_index: usize },
    /// The winner is neither player of the match.
    WinnerNotParticipant { winner: String },
    /// Advancing requires every match of the current round to be decided.
    RoundIncomplete { round: u32, pending: usize },
}

impl std::fmt::Display for OperationRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationRejected::NotActive => write!(f, "Tournament is not in progress"),
            OperationRejected::RoundLocked { round, current } => write!(
                f,
                "Round {} is locked for editing (current round is {})",
                round, current
            ),
            OperationRejected::MatchNotFound { round, match_index } => {
                write!(f, "Round {} has no match #{}", round, match_index)
            }
            OperationRejected::ByeAlreadyResolved { match_index } => {
                write!(f, "Match #{} is a bye and is already resolved", match_index)
            }
            OperationRejected::WinnerNotParticipant { winner } => {
                write!(f, "'{}' is not playing in this match", winner)
            }
            OperationRejected::RoundIncomplete { round, pending } => write!(
                f,
                "Round {} still has {} match(es) without a winner",
                round, pending
            ),
        }
    }
}

impl std::error::Error for OperationRejected {}

/// A persist request against the gateway failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PersistenceError {
    /// No document with this id.
    NotFound(TournamentId),
    /// The stored revision moved on since the writer last saw it.
    StaleRevision { expected: u64, actual: u64 },
    /// Store-specific failure.
    Backend(String),
    /// The background writer is gone (coordinator torn down).
    WriterClosed,
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::NotFound(id) => write!(f, "Tournament {} not found", id),
            PersistenceError::StaleRevision { expected, actual } => write!(
                f,
                "Stale write: expected revision {}, store has {}",
                expected, actual
            ),
            PersistenceError::Backend(msg) => write!(f, "Storage error: {}", msg),
            PersistenceError::WriterClosed => write!(f, "Persistence writer is closed"),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, PartialEq)]
pub enum TournamentError {
    Validation(ValidationError),
    Rejected(OperationRejected),
    Persistence(PersistenceError),
    /// Pairing needs at least two players.
    InvalidRoster { len: usize },
}

pub type TournamentResult<T> = Result<T, TournamentError>;

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::Validation(e) => write!(f, "{}", e),
            TournamentError::Rejected(e) => write!(f, "{}", e),
            TournamentError::Persistence(e) => write!(f, "{}", e),
            TournamentError::InvalidRoster { len } => {
                write!(f, "Cannot pair a roster of {} player(s)", len)
            }
        }
    }
}

impl std::error::Error for TournamentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TournamentError::Validation(e) => Some(e),
            TournamentError::Rejected(e) => Some(e),
            TournamentError::Persistence(e) => Some(e),
            TournamentError::InvalidRoster { .. } => None,
        }
    }
}

impl From<ValidationError> for TournamentError {
    fn from(e: ValidationError) -> Self {
        TournamentError::Validation(e)
    }
}

impl From<OperationRejected> for TournamentError {
    fn from(e: OperationRejected) -> Self {
        TournamentError::Rejected(e)
    }
}

impl From<PersistenceError> for TournamentError {
    fn from(e: PersistenceError) -> Self {
        TournamentError::Persistence(e)
    }
}
