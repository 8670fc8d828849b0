//! Round timer: countdown state machine for the displayed round.
//!
//! This is the pure part. It counts whole seconds when `tick` is called and
//! knows nothing about wall-clock scheduling; see `countdown` for the driver.

use serde::{Deserialize, Serialize};

/// Above this fraction of time left the clock is nominal.
pub const WARNING_FRACTION: f64 = 0.5;
/// Below this fraction of time left the clock is critical.
pub const CRITICAL_FRACTION: f64 = 0.2;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// Not started; full duration remaining.
    #[default]
    Idle,
    Running,
    Paused,
    /// Reached zero; holds there until reset.
    Finished,
}

/// Presentation urgency derived from the remaining fraction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Nominal,
    Warning,
    Critical,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// Timer was not running.
    Ignored,
    /// One second counted down.
    Counted,
    /// This tick reached zero.
    Finished,
}

/// > 0.5 nominal, 0.2..=0.5 warning, < 0.2 critical.
pub fn urgency_for(fraction_remaining: f64) -> Urgency {
    if fraction_remaining > WARNING_FRACTION {
        Urgency::Nominal
    } else if fraction_remaining >= CRITICAL_FRACTION {
        Urgency::Warning
    } else {
        Urgency::Critical
    }
}

/// `MM:SS`, zero-padded.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundTimer {
    duration_seconds: u32,
    remaining_seconds: u32,
    state: TimerState,
}

impl RoundTimer {
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            duration_seconds,
            remaining_seconds: duration_seconds,
            state: TimerState::Idle,
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(minutes.saturating_mul(60))
    }

    /// Idle/Paused -> Running. Returns whether the state changed.
    pub fn start(&mut self) -> bool {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                true
            }
            TimerState::Running | TimerState::Finished => false,
        }
    }

    /// Running -> Paused. Returns whether the state changed.
    pub fn pause(&mut self) -> bool {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            true
        } else {
            false
        }
    }

    /// Back to Idle with the full duration, from any state.
    pub fn reset(&mut self) {
        self.remaining_seconds = self.duration_seconds;
        self.state = TimerState::Idle;
    }

    /// Count one elapsed second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.state = TimerState::Finished;
            TickOutcome::Finished
        } else {
            TickOutcome::Counted
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    pub fn fraction_remaining(&self) -> f64 {
        if self.duration_seconds == 0 {
            return 0.0;
        }
        f64::from(self.remaining_seconds) / f64::from(self.duration_seconds)
    }

    pub fn urgency(&self) -> Urgency {
        urgency_for(self.fraction_remaining())
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            duration_seconds: self.duration_seconds,
            remaining_seconds: self.remaining_seconds,
            fraction_remaining: self.fraction_remaining(),
            urgency: self.urgency(),
            display: format_clock(self.remaining_seconds),
        }
    }
}

/// Read-only view of the timer for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub duration_seconds: u32,
    pub remaining_seconds: u32,
    pub fraction_remaining: f64,
    pub urgency: Urgency,
    /// `MM:SS`.
    pub display: String,
}
