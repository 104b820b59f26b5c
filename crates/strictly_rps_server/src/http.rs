//! Axum REST API over the round service.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/players/` | Roster |
//! | GET | `/players/{name}/profile` | Recent-history stats for one player |
//! | POST | `/games/` | Submit and resolve a round |
//! | GET | `/games/` | All rounds, newest first |
//! | DELETE | `/games/` | Delete every round |
//! | DELETE | `/games/{game_id}` | Delete one round |
//! | GET | `/analysis/` | Win rates, choice patterns, predictions |
//!
//! Diesel calls are blocking, so every handler hands its work to
//! `spawn_blocking`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strictly_rps::Move;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, instrument, warn};

use crate::analysis::{Analysis, PlayerProfile};
use crate::service::{ChoiceSubmission, RoundService, ServiceError};
use crate::{GameRecord, Player};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    service: Arc<RoundService>,
    offset: FixedOffset,
}

impl AppState {
    /// Creates handler state presenting timestamps at `offset`.
    pub fn new(service: RoundService, offset: FixedOffset) -> Self {
        Self {
            service: Arc::new(service),
            offset,
        }
    }
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/players/", get(handle_list_players))
        .route("/players/{name}/profile", get(handle_player_profile))
        .route(
            "/games/",
            get(handle_list_games)
                .post(handle_create_game)
                .delete(handle_delete_all_games),
        )
        .route("/games/{game_id}", delete(handle_delete_game))
        .route("/analysis/", get(handle_analysis))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Request/Response types ──────────────────────────────────────────

/// Body of `POST /games/`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateGameRequest {
    /// One entry per participant.
    pub player_choices: Vec<ChoiceSubmission>,
    /// Accepted for compatibility; the server always uses its own clock.
    #[serde(default)]
    pub game_date: Option<String>,
}

/// A player as listed by `GET /players/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Database id.
    pub id: i32,
    /// Unique display name.
    pub name: String,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: *player.id(),
            name: player.name().clone(),
        }
    }
}

/// One participant's line in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceView {
    /// Player name.
    pub name: String,
    /// Their throw.
    pub choice: Move,
    /// Whether they won the round.
    pub is_winner: bool,
}

/// A recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Database id.
    pub id: i32,
    /// When the round was played, RFC 3339 at the configured offset.
    pub game_date: String,
    /// When the row was written, RFC 3339 at the configured offset.
    pub created_at: String,
    /// Participants in submission order.
    pub players: Vec<ChoiceView>,
}

impl GameView {
    /// Renders a record with timestamps shifted to `offset`.
    pub fn from_record(record: &GameRecord, offset: &FixedOffset) -> Self {
        Self {
            id: *record.game().id(),
            game_date: format_timestamp(record.game().played_at(), offset),
            created_at: format_timestamp(record.game().created_at(), offset),
            players: record
                .choices()
                .iter()
                .map(|c| ChoiceView {
                    name: c.player_name().clone(),
                    choice: *c.choice(),
                    is_winner: *c.is_winner(),
                })
                .collect(),
        }
    }
}

fn format_timestamp(utc: &NaiveDateTime, offset: &FixedOffset) -> String {
    Utc.from_utc_datetime(utc).with_timezone(offset).to_rfc3339()
}

/// Error response carrying a status and a JSON `{"error": ...}` body.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::InvalidRound(_) | ServiceError::UnknownPlayer(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::GameNotFound(_) | ServiceError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Db(e) => {
                error!(error = %e, "Database failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(status = %rejection.status(), "Request body rejected");
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!(status = %rejection.status(), "Path rejected");
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

/// Runs a service call on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!(error = %e, "Blocking task failed");
            ApiError::internal(format!("Task failed: {}", e))
        })?
        .map_err(ApiError::from)
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip(state))]
async fn handle_list_players(State(state): State<AppState>) -> Result<Json<Vec<PlayerView>>, ApiError> {
    let service = state.service.clone();
    let players = run_blocking(move || service.list_players()).await?;
    Ok(Json(players.iter().map(PlayerView::from).collect()))
}

#[instrument(skip(state))]
async fn handle_player_profile(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<PlayerProfile>, ApiError> {
    let Path(name) = name?;
    let service = state.service.clone();
    let profile = run_blocking(move || service.player_profile(&name)).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
async fn handle_list_games(State(state): State<AppState>) -> Result<Json<Vec<GameView>>, ApiError> {
    let service = state.service.clone();
    let games = run_blocking(move || service.list_games()).await?;
    debug!(count = games.len(), "Listing games");
    Ok(Json(
        games
            .iter()
            .map(|g| GameView::from_record(g, &state.offset))
            .collect(),
    ))
}

#[instrument(skip(state))]
async fn handle_analysis(State(state): State<AppState>) -> Result<Json<Analysis>, ApiError> {
    let service = state.service.clone();
    let analysis = run_blocking(move || service.analysis()).await?;
    Ok(Json(analysis))
}

// ── POST handler ────────────────────────────────────────────────────

#[instrument(skip(state, body))]
async fn handle_create_game(
    State(state): State<AppState>,
    body: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Json(req) = body.inspect_err(|e| warn!(error = %e, "Malformed round submission"))?;
    if let Some(date) = &req.game_date {
        debug!(client_date = %date, "Ignoring client-supplied game date");
    }

    let service = state.service.clone();
    let submission = req.player_choices;
    let record = run_blocking(move || service.submit_round(&submission))
        .await
        .inspect_err(|e| warn!(status = %e.status, error = %e.message, "Round rejected"))?;

    Ok(Json(GameView::from_record(&record, &state.offset)))
}

// ── DELETE handlers ─────────────────────────────────────────────────

#[instrument(skip(state))]
async fn handle_delete_game(
    State(state): State<AppState>,
    game_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Path(game_id) = game_id?;
    let service = state.service.clone();
    run_blocking(move || service.delete_game(game_id)).await?;
    Ok(Json(serde_json::json!({ "message": "Game deleted successfully" })))
}

#[instrument(skip(state))]
async fn handle_delete_all_games(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = state.service.clone();
    let deleted = run_blocking(move || service.delete_all_games()).await?;
    Ok(Json(serde_json::json!({
        "message": "All games deleted successfully",
        "deleted": deleted,
    })))
}
