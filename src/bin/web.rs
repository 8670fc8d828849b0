//! Single binary web server: REST API over tournament sessions.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! SESSION_IDLE_HOURS, CLEANUP_INTERVAL_MINUTES.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tcg_tournament_engine::config::ServerConfig;
use tcg_tournament_engine::{
    standings_to_csv, InMemoryGateway, PersistenceError, PersistenceGateway, SyncStatus,
    Tournament, TournamentCoordinator, TournamentDraft, TournamentError, TournamentFilter,
    TournamentId,
};

/// Open session: coordinator + last activity time (for auto-cleanup).
struct SessionEntry {
    coordinator: TournamentCoordinator,
    last_activity: Instant,
}

impl SessionEntry {
    fn new(coordinator: TournamentCoordinator) -> Self {
        Self {
            coordinator,
            last_activity: Instant::now(),
        }
    }
}

struct AppContext {
    sessions: RwLock<HashMap<TournamentId, SessionEntry>>,
    gateway: Arc<dyn PersistenceGateway>,
}

type AppState = Data<AppContext>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct SyncView {
    state: &'static str,
    error: Option<String>,
}

impl From<SyncStatus> for SyncView {
    fn from(status: SyncStatus) -> Self {
        match status {
            SyncStatus::Synced => Self {
                state: "synced",
                error: None,
            },
            SyncStatus::Pending => Self {
                state: "pending",
                error: None,
            },
            SyncStatus::Failed(e) => Self {
                state: "failed",
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TournamentResponse<'a> {
    #[serde(flatten)]
    tournament: &'a Tournament,
    sync: SyncView,
    time_up_with_pending_results: bool,
}

#[derive(Deserialize)]
struct ListQuery {
    game: Option<String>,
}

#[derive(Deserialize)]
struct RecordResultBody {
    round: u32,
    match_index: usize,
    winner: String,
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TimerAction {
    Start,
    Pause,
    Reset,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and timer action (e.g. /api/tournaments/{id}/timer/start)
#[derive(Deserialize)]
struct TimerPath {
    id: TournamentId,
    action: TimerAction,
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn persistence_error_response(e: &PersistenceError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        PersistenceError::NotFound(_) => HttpResponse::NotFound().json(body),
        PersistenceError::StaleRevision { .. } => HttpResponse::Conflict().json(body),
        PersistenceError::Backend(_) | PersistenceError::WriterClosed => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn error_response(e: &TournamentError) -> HttpResponse {
    match e {
        TournamentError::Validation(v) => HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": e.to_string(), "field": v.field().to_string() })),
        TournamentError::Rejected(_) | TournamentError::InvalidRoster { .. } => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
        TournamentError::Persistence(p) => persistence_error_response(p),
    }
}

fn tournament_response(coordinator: &TournamentCoordinator) -> HttpResponse {
    HttpResponse::Ok().json(TournamentResponse {
        tournament: coordinator.snapshot(),
        sync: coordinator.sync_status().into(),
        time_up_with_pending_results: coordinator.time_up_with_pending_results(),
    })
}

/// Staff get alerted through the log when a round's clock runs out.
fn with_time_up_alert(mut coordinator: TournamentCoordinator) -> TournamentCoordinator {
    let id = coordinator.id();
    coordinator.set_time_up_notifier(Arc::new(move |round| {
        log::warn!("Tournament {}: round {} is out of time", id, round);
    }));
    coordinator
}

/// Make sure a session exists for `id`, loading the document from the store if needed.
async fn ensure_session(state: &AppContext, id: TournamentId) -> Result<(), HttpResponse> {
    let known = match state.sessions.read() {
        Ok(g) => g.contains_key(&id),
        Err(_) => return Err(lock_error()),
    };
    if known {
        return Ok(());
    }
    let snapshot = state
        .gateway
        .fetch(id)
        .await
        .map_err(|e| persistence_error_response(&e))?;
    let coordinator = with_time_up_alert(TournamentCoordinator::attach(
        snapshot,
        Arc::clone(&state.gateway),
    ));
    let mut g = state.sessions.write().map_err(|_| lock_error())?;
    g.entry(id).or_insert_with(|| SessionEntry::new(coordinator));
    Ok(())
}

/// Run `f` against the session for `id`. Touching it refreshes last_activity.
async fn with_session<F>(state: &AppContext, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut TournamentCoordinator) -> HttpResponse,
{
    if let Err(response) = ensure_session(state, id).await {
        return response;
    }
    let mut g = match state.sessions.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&mut entry.coordinator)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tcg-tournament-engine",
    })
}

/// Create a tournament from a draft; round 1 is paired immediately.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<TournamentDraft>) -> HttpResponse {
    let coordinator =
        match TournamentCoordinator::create(body.into_inner(), Arc::clone(&state.gateway)).await {
            Ok(c) => with_time_up_alert(c),
            Err(e) => return error_response(&e),
        };
    let response = tournament_response(&coordinator);
    match state.sessions.write() {
        Ok(mut g) => {
            g.insert(coordinator.id(), SessionEntry::new(coordinator));
        }
        Err(_) => return lock_error(),
    }
    response
}

/// List stored tournaments, optionally for one game, most advanced round first.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState, query: Query<ListQuery>) -> HttpResponse {
    let filter = TournamentFilter {
        game: query.into_inner().game,
    };
    match state.gateway.list(&filter).await {
        Ok(tournaments) => HttpResponse::Ok().json(tournaments),
        Err(e) => persistence_error_response(&e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, path.id, |c| tournament_response(c)).await
}

/// Operator action: remove the stored document and close the session.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(e) = state.gateway.delete(path.id).await {
        return persistence_error_response(&e);
    }
    match state.sessions.write() {
        Ok(mut g) => {
            g.remove(&path.id);
        }
        Err(_) => return lock_error(),
    }
    log::info!("Deleted tournament {}", path.id);
    HttpResponse::NoContent().finish()
}

/// Set the winner of one match in the current round.
#[put("/api/tournaments/{id}/matches/winner")]
async fn api_record_result(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    with_session(&state, path.id, |c| {
        match c.record_result(body.round, body.match_index, &body.winner) {
            Ok(_) => tournament_response(c),
            Err(e) => error_response(&e),
        }
    })
    .await
}

/// Pair the next round, or finish the tournament from the last one.
#[post("/api/tournaments/{id}/advance")]
async fn api_advance(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, path.id, |c| match c.advance() {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&e),
    })
    .await
}

/// Replace the session's snapshot with the stored document, dropping unsent writes.
#[post("/api/tournaments/{id}/resync")]
async fn api_resync(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let remote = match state.gateway.fetch(path.id).await {
        Ok(t) => t,
        Err(e) => return persistence_error_response(&e),
    };
    with_session(&state, path.id, |c| {
        if c.apply_remote_snapshot(remote) {
            log::info!("Tournament {}: resynced from the store", c.id());
        }
        tournament_response(c)
    })
    .await
}

#[get("/api/tournaments/{id}/round")]
async fn api_current_round(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, path.id, |c| match c.current_round_view() {
        Some(view) => HttpResponse::Ok().json(view),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No current round" })),
    })
    .await
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, path.id, |c| {
        HttpResponse::Ok().json(serde_json::json!({
            "roundsPlayed": c.snapshot().rounds_played(),
            "standings": c.standings_view(),
        }))
    })
    .await
}

#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, path.id, |c| match standings_to_csv(&c.standings_view()) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => {
            log::error!("Failed to render standings for {}: {}", c.id(), e);
            HttpResponse::InternalServerError().body("csv error")
        }
    })
    .await
}

#[get("/api/tournaments/{id}/timer")]
async fn api_timer(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, path.id, |c| HttpResponse::Ok().json(c.timer_view())).await
}

/// Start, pause or reset the current round's countdown.
#[post("/api/tournaments/{id}/timer/{action}")]
async fn api_timer_action(state: AppState, path: Path<TimerPath>) -> HttpResponse {
    let action = path.action;
    with_session(&state, path.id, |c| {
        match action {
            TimerAction::Start => c.start_timer(),
            TimerAction::Pause => c.pause_timer(),
            TimerAction::Reset => c.reset_timer(),
        }
        HttpResponse::Ok().json(c.timer_view())
    })
    .await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let (host, port) = config.bind_address();
    log::info!("Starting server at http://{}:{}", host, port);

    let gateway: Arc<dyn PersistenceGateway> = Arc::new(InMemoryGateway::new());
    let state = Data::new(AppContext {
        sessions: RwLock::new(HashMap::new()),
        gateway: Arc::clone(&gateway),
    });

    // Snapshots pushed by the store replace the matching open session's snapshot.
    let state_sync = state.clone();
    let mut subscription = gateway.subscribe(TournamentFilter::all());
    actix_web::rt::spawn(async move {
        while let Some(snapshot) = subscription.next().await {
            let mut g = match state_sync.sessions.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            if let Some(entry) = g.get_mut(&snapshot.id) {
                entry.coordinator.apply_remote_snapshot(snapshot);
            }
        }
    });

    // Background task: drop sessions idle past the timeout (documents stay in the store).
    let state_cleanup = state.clone();
    let idle_timeout = config.session_idle_timeout;
    let cleanup_interval = config.cleanup_interval;
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.sessions.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < idle_timeout);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Closed {} idle tournament session(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_list_tournaments)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_record_result)
            .service(api_advance)
            .service(api_resync)
            .service(api_current_round)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_timer)
            .service(api_timer_action)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
