//! Lobby listing handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{LobbyParams, LobbyResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServiceError};

/// `GET /lobby` — Latest capture grouped by version.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] before the first capture.
#[utoipa::path(
    get,
    path = "/api/v1/lobby",
    tag = "Lobby",
    summary = "Lobby listing",
    description = "Groups the latest capture by version, newest first. Empty sessions and outdated versions are hidden unless requested; dev and pre-release builds are always shown.",
    params(LobbyParams),
    responses(
        (status = 200, description = "Grouped lobby", body = LobbyResponse),
        (status = 404, description = "Nothing captured yet", body = ErrorResponse),
    )
)]
pub async fn lobby(
    State(state): State<AppState>,
    Query(params): Query<LobbyParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state.lobby.lobby_view(params.into()).await?;
    Ok(Json(LobbyResponse::from(view)))
}

/// Lobby routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/lobby", get(lobby))
}
