//! Integration tests for the round timer and its countdown driver.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tcg_tournament_engine::{
    format_clock, urgency_for, RoundCountdown, RoundTimer, TickOutcome, TimerState, Urgency,
};

#[test]
fn five_ticks_finish_a_five_second_timer() {
    let mut timer = RoundTimer::new(5);
    assert!(timer.start());
    for _ in 0..4 {
        assert_eq!(timer.tick(), TickOutcome::Counted);
    }
    assert_eq!(timer.tick(), TickOutcome::Finished);
    assert_eq!(timer.state(), TimerState::Finished);
    assert_eq!(timer.remaining_seconds(), 0);

    // Holds at zero.
    assert_eq!(timer.tick(), TickOutcome::Ignored);
    assert_eq!(timer.remaining_seconds(), 0);

    timer.reset();
    assert_eq!(timer.state(), TimerState::Idle);
    assert_eq!(timer.remaining_seconds(), 5);
}

#[test]
fn pause_and_start_are_idempotent() {
    let mut timer = RoundTimer::from_minutes(1);
    assert_eq!(timer.duration_seconds(), 60);

    assert!(!timer.pause(), "pause while idle is a no-op");
    assert!(timer.start());
    assert!(!timer.start(), "start while running is a no-op");
    timer.tick();
    assert!(timer.pause());
    assert!(!timer.pause(), "pause while paused is a no-op");
    assert_eq!(timer.state(), TimerState::Paused);
    assert_eq!(timer.tick(), TickOutcome::Ignored);
    assert_eq!(timer.remaining_seconds(), 59);

    assert!(timer.start());
    assert_eq!(timer.state(), TimerState::Running);
}

#[test]
fn start_while_finished_is_a_no_op() {
    let mut timer = RoundTimer::new(1);
    timer.start();
    assert_eq!(timer.tick(), TickOutcome::Finished);
    assert!(!timer.start());
    assert_eq!(timer.state(), TimerState::Finished);
}

#[test]
fn urgency_thresholds() {
    assert_eq!(urgency_for(1.0), Urgency::Nominal);
    assert_eq!(urgency_for(0.51), Urgency::Nominal);
    assert_eq!(urgency_for(0.5), Urgency::Warning);
    assert_eq!(urgency_for(0.2), Urgency::Warning);
    assert_eq!(urgency_for(0.19), Urgency::Critical);
    assert_eq!(urgency_for(0.0), Urgency::Critical);
}

#[test]
fn snapshot_tracks_remaining_time() {
    let mut timer = RoundTimer::new(10);
    timer.start();
    for _ in 0..6 {
        timer.tick();
    }
    let snap = timer.snapshot();
    assert_eq!(snap.remaining_seconds, 4);
    assert!((snap.fraction_remaining - 0.4).abs() < 1e-9);
    assert_eq!(snap.urgency, Urgency::Warning);
    assert_eq!(snap.display, "00:04");
}

#[test]
fn clock_format_is_zero_padded() {
    assert_eq!(format_clock(3000), "50:00");
    assert_eq!(format_clock(65), "01:05");
    assert_eq!(format_clock(0), "00:00");
}

#[tokio::test(start_paused = true)]
async fn countdown_runs_out_and_notifies_once() {
    let fired = Arc::new(AtomicUsize::new(0));
    let mut countdown = RoundCountdown::new(3, 3);
    let counter = Arc::clone(&fired);
    countdown.set_notifier(Arc::new(move |round| {
        assert_eq!(round, 3);
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    countdown.start();
    assert!(countdown.is_ticking());
    tokio::time::sleep(Duration::from_secs(5)).await;

    let snap = countdown.snapshot();
    assert_eq!(snap.state, TimerState::Finished);
    assert_eq!(snap.remaining_seconds, 0);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!countdown.is_ticking());

    countdown.start();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn pause_stops_the_tick() {
    let mut countdown = RoundCountdown::new(1, 60);
    countdown.start();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    countdown.pause();
    assert!(!countdown.is_ticking());
    let remaining = countdown.snapshot().remaining_seconds;
    assert_eq!(remaining, 58);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(countdown.snapshot().remaining_seconds, remaining);
    assert_eq!(countdown.snapshot().state, TimerState::Paused);
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_the_tick() {
    let mut countdown = RoundCountdown::new(1, 30);
    countdown.start();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    countdown.reset();
    assert!(!countdown.is_ticking());

    tokio::time::sleep(Duration::from_secs(5)).await;
    let snap = countdown.snapshot();
    assert_eq!(snap.state, TimerState::Idle);
    assert_eq!(snap.remaining_seconds, 30);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_countdown_cancels_the_tick() {
    let fired = Arc::new(AtomicUsize::new(0));
    let mut countdown = RoundCountdown::new(1, 3);
    let counter = Arc::clone(&fired);
    countdown.set_notifier(Arc::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    countdown.start();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    drop(countdown);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn resuming_waits_a_full_tick() {
    let mut countdown = RoundCountdown::new(1, 60);
    countdown.start();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    countdown.pause();
    assert_eq!(countdown.snapshot().remaining_seconds, 59);

    countdown.start();
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(countdown.snapshot().remaining_seconds, 59);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(countdown.snapshot().remaining_seconds, 58);
}

#[tokio::test(start_paused = true)]
async fn new_round_starts_from_a_fresh_idle_timer() {
    let mut countdown = RoundCountdown::new(1, 30);
    countdown.start();
    tokio::time::sleep(Duration::from_millis(3500)).await;
    countdown.restart_for_round(2, 45);

    assert_eq!(countdown.round_number(), 2);
    assert!(!countdown.is_ticking());
    let snap = countdown.snapshot();
    assert_eq!(snap.state, TimerState::Idle);
    assert_eq!(snap.remaining_seconds, 45);
}
