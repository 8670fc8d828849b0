//! Countdown driver: runs the round timer's one-second tick on the Tokio runtime.
//!
//! The tick task exists only while the timer is Running. Pause, reset, a new
//! round and drop all abort it, so no scheduled work outlives the countdown.

use crate::logic::timer::{RoundTimer, TickOutcome, TimerSnapshot};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Wall-clock length of one timer unit.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Called once when a round's time runs out, with the round number.
pub type TimeUpNotifier = Arc<dyn Fn(u32) + Send + Sync>;

pub struct RoundCountdown {
    timer: Arc<Mutex<RoundTimer>>,
    round_number: u32,
    ticker: Option<JoinHandle<()>>,
    on_time_up: Option<TimeUpNotifier>,
}

impl RoundCountdown {
    pub fn new(round_number: u32, duration_seconds: u32) -> Self {
        Self {
            timer: Arc::new(Mutex::new(RoundTimer::new(duration_seconds))),
            round_number,
            ticker: None,
            on_time_up: None,
        }
    }

    pub fn set_notifier(&mut self, notifier: TimeUpNotifier) {
        self.on_time_up = Some(notifier);
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Start or resume. Must be called from within a Tokio runtime.
    ///
    /// Resuming waits a full tick period before the next count; a partial
    /// second elapsed before a pause is not carried over.
    pub fn start(&mut self) {
        let started = lock(&self.timer).start();
        if started {
            self.cancel_ticker();
            self.ticker = Some(self.spawn_ticker());
        }
    }

    pub fn pause(&mut self) {
        lock(&self.timer).pause();
        self.cancel_ticker();
    }

    pub fn reset(&mut self) {
        self.cancel_ticker();
        lock(&self.timer).reset();
    }

    /// A new round begins: stop ticking and start over with a fresh Idle timer.
    pub fn restart_for_round(&mut self, round_number: u32, duration_seconds: u32) {
        self.cancel_ticker();
        *lock(&self.timer) = RoundTimer::new(duration_seconds);
        self.round_number = round_number;
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        lock(&self.timer).snapshot()
    }

    pub fn is_finished(&self) -> bool {
        lock(&self.timer).is_finished()
    }

    /// True while a tick task is scheduled and has not exited.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let timer = Arc::clone(&self.timer);
        let notifier = self.on_time_up.clone();
        let round_number = self.round_number;
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                interval.tick().await;
                let outcome = lock(&timer).tick();
                match outcome {
                    TickOutcome::Counted => {}
                    TickOutcome::Finished => {
                        log::warn!("Round {} time is up", round_number);
                        if let Some(notify) = &notifier {
                            notify(round_number);
                        }
                        break;
                    }
                    TickOutcome::Ignored => break,
                }
            }
        })
    }
}

impl Drop for RoundCountdown {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

fn lock(timer: &Mutex<RoundTimer>) -> std::sync::MutexGuard<'_, RoundTimer> {
    timer.lock().unwrap_or_else(PoisonError::into_inner)
}
