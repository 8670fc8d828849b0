//! Café TCG tournament engine: library with models, business logic and the persistence seam.

pub mod config;
pub mod logic;
pub mod models;
pub mod persistence;

pub use logic::{
    compute_standings, ensure_round_completed, format_clock, generate_pairings, record_result,
    standings_to_csv, urgency_for, winrate, AdvanceOutcome, CurrentRoundView, Medal,
    RoundCountdown, RoundTimer, Standing, TickOutcome, TimeUpNotifier, TimerSnapshot, TimerState,
    TournamentCoordinator, Urgency,
};
pub use models::{
    DraftField, GameMatch, LifecycleState, OperationRejected, PersistenceError, PlayerName, Round,
    RoundState, Tournament, TournamentDraft, TournamentError, TournamentId, TournamentResult,
    ValidationError,
};
pub use persistence::{
    InMemoryGateway, PersistenceGateway, ReplaceFields, ReplaceRequest, SnapshotSubscription,
    SyncStatus, TournamentFilter,
};
