//! Integration tests for the in-memory document store.

use std::time::Duration;
use tcg_tournament_engine::{
    GameMatch, InMemoryGateway, LifecycleState, PersistenceError, PersistenceGateway,
    ReplaceFields, ReplaceRequest, Round, Tournament, TournamentDraft, TournamentFilter,
};

fn document(game: &str, name: &str) -> Tournament {
    let mut draft = TournamentDraft::new(game, name);
    draft.add_player("A").unwrap();
    draft.add_player("B").unwrap();
    Tournament::from_draft(draft, Round::new(1, vec![GameMatch::new("A", "B")]))
}

fn decided_history() -> Vec<Round> {
    let mut m = GameMatch::new("A", "B");
    m.winner = Some("A".to_string());
    vec![Round::new(1, vec![m])]
}

#[tokio::test]
async fn create_assigns_a_fresh_id() {
    let store = InMemoryGateway::new();
    let doc = document("Magic", "Draft");
    let a = store.create(&doc).await.unwrap();
    let b = store.create(&doc).await.unwrap();

    assert_ne!(a, b);
    assert!(!a.is_nil());
    assert_eq!(store.len(), 2);
    let stored = store.fetch(a).await.unwrap();
    assert_eq!(stored.id, a);
    assert_eq!(stored.name, "Draft");
}

#[tokio::test]
async fn replace_overwrites_fields_when_revision_matches() {
    let store = InMemoryGateway::new();
    let id = store.create(&document("Magic", "Draft")).await.unwrap();

    store
        .replace(
            id,
            ReplaceRequest {
                base_revision: 0,
                revision: 1,
                fields: ReplaceFields::Progress {
                    history: decided_history(),
                    current_round_number: 1,
                },
            },
        )
        .await
        .unwrap();
    store
        .replace(
            id,
            ReplaceRequest {
                base_revision: 1,
                revision: 2,
                fields: ReplaceFields::Lifecycle {
                    lifecycle_state: LifecycleState::Finished,
                },
            },
        )
        .await
        .unwrap();

    let stored = store.fetch(id).await.unwrap();
    assert_eq!(stored.revision, 2);
    assert_eq!(stored.lifecycle_state, LifecycleState::Finished);
    assert_eq!(stored.history, decided_history());
    assert_eq!(stored.roster, ["A", "B"]);
}

#[tokio::test]
async fn stale_base_revision_is_rejected_without_changes() {
    let store = InMemoryGateway::new();
    let id = store.create(&document("Magic", "Draft")).await.unwrap();

    let err = store
        .replace(
            id,
            ReplaceRequest {
                base_revision: 3,
                revision: 4,
                fields: ReplaceFields::Lifecycle {
                    lifecycle_state: LifecycleState::Finished,
                },
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PersistenceError::StaleRevision {
            expected: 3,
            actual: 0
        }
    );
    let stored = store.fetch(id).await.unwrap();
    assert_eq!(stored.lifecycle_state, LifecycleState::Active);
    assert_eq!(stored.revision, 0);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let store = InMemoryGateway::new();
    let id = uuid::Uuid::new_v4();
    assert_eq!(store.fetch(id).await, Err(PersistenceError::NotFound(id)));
    assert_eq!(store.delete(id).await, Err(PersistenceError::NotFound(id)));
    let err = store
        .replace(
            id,
            ReplaceRequest {
                base_revision: 0,
                revision: 1,
                fields: ReplaceFields::Lifecycle {
                    lifecycle_state: LifecycleState::Finished,
                },
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, PersistenceError::NotFound(id));
}

#[tokio::test]
async fn delete_removes_the_document() {
    let store = InMemoryGateway::new();
    let id = store.create(&document("Magic", "Draft")).await.unwrap();
    store.delete(id).await.unwrap();
    assert!(store.is_empty());
    assert!(store.fetch(id).await.is_err());
}

#[tokio::test]
async fn list_filters_by_game_and_puts_later_rounds_first() {
    let store = InMemoryGateway::new();
    let early = store.create(&document("Magic", "Early")).await.unwrap();

    let mut later = document("Magic", "Later");
    later.history.push(Round::new(2, vec![GameMatch::new("B", "A")]));
    later.current_round_number = 2;
    let later = store.create(&later).await.unwrap();

    store
        .create(&document("Pokémon", "Elsewhere"))
        .await
        .unwrap();

    let magic = store.list(&TournamentFilter::for_game("Magic")).await.unwrap();
    let ids: Vec<_> = magic.iter().map(|t| t.id).collect();
    assert_eq!(ids, [later, early]);

    let all = store.list(&TournamentFilter::all()).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn subscribers_receive_matching_snapshots() {
    let store = InMemoryGateway::new();
    let mut magic = store.subscribe(TournamentFilter::for_game("Magic"));
    let mut everything = store.subscribe(TournamentFilter::all());

    store.create(&document("Pokémon", "Elsewhere")).await.unwrap();
    let id = store.create(&document("Magic", "Draft")).await.unwrap();
    store
        .replace(
            id,
            ReplaceRequest {
                base_revision: 0,
                revision: 1,
                fields: ReplaceFields::Progress {
                    history: decided_history(),
                    current_round_number: 1,
                },
            },
        )
        .await
        .unwrap();

    let wait = Duration::from_secs(1);
    let created = tokio::time::timeout(wait, magic.next()).await.unwrap().unwrap();
    assert_eq!((created.id, created.revision), (id, 0));
    let updated = tokio::time::timeout(wait, magic.next()).await.unwrap().unwrap();
    assert_eq!(updated.revision, 1);
    assert!(updated.history[0].is_completed());

    let first = tokio::time::timeout(wait, everything.next()).await.unwrap().unwrap();
    assert_eq!(first.game, "Pokémon");
}

#[tokio::test]
async fn subscription_ends_when_the_store_is_dropped() {
    let store = InMemoryGateway::new();
    let mut subscription = store.subscribe(TournamentFilter::all());
    drop(store);
    assert!(subscription.next().await.is_none());
}
