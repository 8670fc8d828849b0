//! Integration tests for the round state machine: recording results and completion.

use tcg_tournament_engine::{
    ensure_round_completed, record_result, GameMatch, LifecycleState, OperationRejected, Round,
    RoundState, Tournament, TournamentDraft,
};

/// Round 1: A vs B, C vs D, E has a bye.
fn tournament() -> Tournament {
    let mut draft = TournamentDraft::new("Pokémon", "Friday League");
    for name in ["A", "B", "C", "D", "E"] {
        draft.add_player(name).unwrap();
    }
    draft.total_rounds = 2;
    let matches = vec![
        GameMatch::new("A", "B"),
        GameMatch::new("C", "D"),
        GameMatch::bye("E"),
    ];
    Tournament::from_draft(draft, Round::new(1, matches))
}

#[test]
fn recording_all_results_completes_the_round() {
    let mut t = tournament();
    assert_eq!(t.current_round().unwrap().state(), RoundState::Open);

    assert_eq!(record_result(&mut t, 1, 0, "A").unwrap(), RoundState::Open);
    assert_eq!(record_result(&mut t, 1, 1, "D").unwrap(), RoundState::Completed);

    let round = t.current_round().unwrap();
    assert!(round.is_completed());
    assert_eq!(round.matches[0].winner.as_deref(), Some("A"));
    assert_eq!(round.matches[1].winner.as_deref(), Some("D"));
    assert!(ensure_round_completed(&t).is_ok());
}

#[test]
fn winner_must_be_a_participant() {
    let mut t = tournament();
    let err = record_result(&mut t, 1, 0, "C").unwrap_err();
    assert_eq!(
        err,
        OperationRejected::WinnerNotParticipant {
            winner: "C".to_string()
        }
    );
    assert!(t.current_round().unwrap().matches[0].winner.is_none());
}

#[test]
fn bye_cannot_be_edited() {
    let mut t = tournament();
    assert_eq!(
        record_result(&mut t, 1, 2, "E"),
        Err(OperationRejected::ByeAlreadyResolved { match_index: 2 })
    );
}

#[test]
fn only_current_round_is_editable() {
    let mut t = tournament();
    assert_eq!(
        record_result(&mut t, 2, 0, "A"),
        Err(OperationRejected::RoundLocked {
            round: 2,
            current: 1
        })
    );
    assert_eq!(
        record_result(&mut t, 1, 9, "A"),
        Err(OperationRejected::MatchNotFound {
            round: 1,
            match_index: 9
        })
    );
}

#[test]
fn finished_tournament_rejects_results() {
    let mut t = tournament();
    t.lifecycle_state = LifecycleState::Finished;
    assert_eq!(
        record_result(&mut t, 1, 0, "A"),
        Err(OperationRejected::NotActive)
    );
}

#[test]
fn decided_match_can_be_corrected_and_stays_completed() {
    let mut t = tournament();
    record_result(&mut t, 1, 0, "A").unwrap();
    record_result(&mut t, 1, 1, "C").unwrap();
    assert_eq!(record_result(&mut t, 1, 0, "B").unwrap(), RoundState::Completed);
    assert_eq!(
        t.current_round().unwrap().matches[0].winner.as_deref(),
        Some("B")
    );
}

#[test]
fn incomplete_round_reports_pending_matches() {
    let mut t = tournament();
    record_result(&mut t, 1, 0, "A").unwrap();
    assert_eq!(
        ensure_round_completed(&t),
        Err(OperationRejected::RoundIncomplete {
            round: 1,
            pending: 1
        })
    );
}

#[test]
fn completed_flag_is_derived_on_both_sides_of_serialization() {
    let mut t = tournament();
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(json["history"][0]["completed"], false);
    assert_eq!(json["lifecycleState"], "active");
    assert_eq!(json["currentRoundNumber"], 1);
    assert!(json["history"][0]["matches"][0]["winner"].is_null());

    // A stored `completed: true` that disagrees with the matches is ignored.
    let mut forged = json.clone();
    forged["history"][0]["completed"] = serde_json::Value::Bool(true);
    let read: Tournament = serde_json::from_value(forged).unwrap();
    assert!(!read.history[0].is_completed());

    record_result(&mut t, 1, 0, "B").unwrap();
    record_result(&mut t, 1, 1, "C").unwrap();
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(json["history"][0]["completed"], true);
}
