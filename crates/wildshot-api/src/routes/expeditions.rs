//! Routes for the Expedition bounded context.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use wildshot_core::command::Command;
use wildshot_core::repository::StoredEvent;
use wildshot_expedition::application::command_handlers;
use wildshot_expedition::application::query_handlers::{self, ExpeditionView};
use wildshot_expedition::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /start.
#[derive(Debug, Deserialize)]
pub struct StartExpeditionRequest {
    /// Name shown on the leaderboard.
    pub player_name: String,
}

/// Request body for POST /reveal-scene and POST /expire.
#[derive(Debug, Deserialize)]
pub struct ExpeditionRequest {
    /// The expedition to act on.
    pub expedition_id: Uuid,
}

/// Request body for POST /photograph.
#[derive(Debug, Deserialize)]
pub struct PhotographRequest {
    /// The expedition the photo belongs to.
    pub expedition_id: Uuid,
    /// The cropped region of the panorama, as a URL or `data:` URL.
    pub image_url: String,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The aggregate ID affected or created by the command.
    pub aggregate_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

/// Response body for POST /reveal-scene.
#[derive(Debug, Serialize)]
pub struct SceneResponse {
    /// The expedition.
    pub aggregate_id: Uuid,
    /// Empty when no panorama was produced.
    pub event_ids: Vec<Uuid>,
    /// The new panorama.
    pub scene_url: Option<String>,
}

/// Response body for POST /photograph.
#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    /// The expedition.
    pub aggregate_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
    /// The enhanced photo.
    pub photo_url: String,
    /// What the vision model saw.
    pub analysis: String,
    /// Label for the discovery.
    pub species: String,
    /// Points earned by this photo.
    pub score: u32,
    /// Whether this photo finished the expedition.
    pub expedition_ended: bool,
}

fn event_ids(stored_events: &[StoredEvent]) -> Vec<Uuid> {
    stored_events.iter().map(|e| e.event_id).collect()
}

/// POST /start
#[instrument(skip(state, request))]
async fn start_expedition(
    State(state): State<AppState>,
    Json(request): Json<StartExpeditionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::StartExpedition {
        correlation_id: Uuid::new_v4(),
        player_name: request.player_name,
        time_limit_secs: state.default_time_limit_secs,
    };

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling command"
    );

    let result = command_handlers::handle_start_expedition(
        &command,
        &state.catalog,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse {
        aggregate_id: result.aggregate_id,
        event_ids: event_ids(&result.stored_events),
    }))
}

/// POST /reveal-scene
#[instrument(skip(state, request), fields(expedition_id = %request.expedition_id))]
async fn reveal_scene(
    State(state): State<AppState>,
    Json(request): Json<ExpeditionRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::RevealScene {
        correlation_id: Uuid::new_v4(),
        expedition_id: request.expedition_id,
    };

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling command"
    );

    let result = command_handlers::handle_reveal_scene(
        &command,
        &state.catalog,
        state.studio.scene_generator.as_ref(),
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(SceneResponse {
        aggregate_id: result.aggregate_id,
        event_ids: event_ids(&result.stored_events),
        scene_url: result.scene_url,
    }))
}

/// POST /photograph
#[instrument(skip(state, request), fields(expedition_id = %request.expedition_id))]
async fn photograph_subject(
    State(state): State<AppState>,
    Json(request): Json<PhotographRequest>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let command = commands::PhotographSubject {
        correlation_id: Uuid::new_v4(),
        expedition_id: request.expedition_id,
        image_url: request.image_url,
    };

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling command"
    );

    let result = command_handlers::handle_photograph_subject(
        &command,
        &state.catalog,
        state.studio.photo_pipeline(),
        state.result_archive.as_ref(),
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(PhotoResponse {
        aggregate_id: result.aggregate_id,
        event_ids: event_ids(&result.stored_events),
        photo_url: result.photo_url,
        analysis: result.analysis,
        species: result.species,
        score: result.score,
        expedition_ended: result.expedition_ended,
    }))
}

/// POST /expire
#[instrument(skip(state, request), fields(expedition_id = %request.expedition_id))]
async fn expire_expedition(
    State(state): State<AppState>,
    Json(request): Json<ExpeditionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ExpireExpedition {
        correlation_id: Uuid::new_v4(),
        expedition_id: request.expedition_id,
    };

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling command"
    );

    let result = command_handlers::handle_expire_expedition(
        &command,
        state.result_archive.as_ref(),
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse {
        aggregate_id: result.aggregate_id,
        event_ids: event_ids(&result.stored_events),
    }))
}

/// GET /{expedition_id}
#[instrument(skip(state))]
async fn get_expedition(
    State(state): State<AppState>,
    Path(expedition_id): Path<Uuid>,
) -> Result<Json<ExpeditionView>, ApiError> {
    let view = query_handlers::get_expedition_by_id(
        expedition_id,
        &state.catalog,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(view))
}

/// Returns the router for the expedition context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_expedition))
        .route("/reveal-scene", post(reveal_scene))
        .route("/photograph", post(photograph_subject))
        .route("/expire", post(expire_expedition))
        .route("/{expedition_id}", get(get_expedition))
}
