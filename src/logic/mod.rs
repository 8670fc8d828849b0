//! Tournament business logic: pairing, rounds, standings, round timer and the lifecycle coordinator.

mod coordinator;
mod countdown;
mod pairing;
mod rounds;
mod standings;
mod timer;

pub use coordinator::{AdvanceOutcome, CurrentRoundView, TournamentCoordinator};
pub use countdown::{RoundCountdown, TimeUpNotifier, TICK_PERIOD};
pub use pairing::generate_pairings;
pub use rounds::{ensure_round_completed, record_result};
pub use standings::{compute_standings, standings_to_csv, winrate, Medal, Standing};
pub use timer::{
    format_clock, urgency_for, RoundTimer, TickOutcome, TimerSnapshot, TimerState, Urgency,
    CRITICAL_FRACTION, WARNING_FRACTION,
};
