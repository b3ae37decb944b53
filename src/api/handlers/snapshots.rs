//! Snapshot read handlers: latest capture and time-range history.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ListMeta, RangeParams, SnapshotDto, SnapshotListResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServiceError};

/// `GET /snapshots/latest` — Newest capture.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] before the first capture.
#[utoipa::path(
    get,
    path = "/api/v1/snapshots/latest",
    tag = "Snapshots",
    summary = "Latest snapshot",
    description = "Returns the most recent capture, including ticks that were not persisted.",
    responses(
        (status = 200, description = "Latest snapshot", body = SnapshotDto),
        (status = 404, description = "Nothing captured yet", body = ErrorResponse),
    )
)]
pub async fn latest_snapshot(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let snapshot = state
        .lobby
        .latest_snapshot()
        .await?
        .ok_or_else(|| ServiceError::NotFound("no snapshot captured yet".to_string()))?;
    Ok(Json(SnapshotDto::from(snapshot)))
}

/// `GET /snapshots?from&to` — Stored snapshots in a closed range.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] when `from > to`.
#[utoipa::path(
    get,
    path = "/api/v1/snapshots",
    tag = "Snapshots",
    summary = "Snapshots in range",
    description = "Returns persisted snapshots with from <= timestamp <= to, oldest first.",
    params(RangeParams),
    responses(
        (status = 200, description = "Snapshots in range", body = SnapshotListResponse),
        (status = 400, description = "Inverted range", body = ErrorResponse),
    )
)]
pub async fn list_snapshots(
    State(state): State<AppState>,
    Query(range): Query<RangeParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let snapshots = state.lobby.snapshots_in_range(range.from, range.to).await?;
    let data: Vec<SnapshotDto> = snapshots.into_iter().map(SnapshotDto::from).collect();
    Ok(Json(SnapshotListResponse {
        meta: ListMeta { count: data.len() },
        data,
    }))
}

/// Snapshot routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/snapshots", get(list_snapshots))
        .route("/snapshots/latest", get(latest_snapshot))
}
