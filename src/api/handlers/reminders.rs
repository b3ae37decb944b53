//! Reminder self-service handlers: list, get, add, clear, remove.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::dto::{
    AddReminderRequest, AddReminderResponse, ClearRemindersResponse, ReminderListResponse,
    ReminderSetDto, RemoveReminderResponse,
};
use crate::app_state::AppState;
use crate::domain::{AddOutcome, SubscriberId};
use crate::error::{ErrorResponse, ServiceError};

/// `GET /reminders` — Every reminder record.
///
/// # Errors
///
/// Returns a persistence error.
#[utoipa::path(
    get,
    path = "/api/v1/reminders",
    tag = "Reminders",
    summary = "List reminders",
    description = "Returns every subscriber's tracked names.",
    responses(
        (status = 200, description = "All records", body = ReminderListResponse),
    )
)]
pub async fn list_reminders(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let sets = state.reminders.list_all().await?;
    Ok(Json(ReminderListResponse {
        data: sets.into_iter().map(ReminderSetDto::from).collect(),
    }))
}

/// `GET /reminders/{subscriber_id}` — One subscriber's names.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if the subscriber tracks nothing.
#[utoipa::path(
    get,
    path = "/api/v1/reminders/{subscriber_id}",
    tag = "Reminders",
    summary = "Get reminders",
    params(
        ("subscriber_id" = i64, Path, description = "Subscriber identity"),
    ),
    responses(
        (status = 200, description = "Tracked names", body = ReminderSetDto),
        (status = 404, description = "No record", body = ErrorResponse),
    )
)]
pub async fn get_reminders(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let set = state
        .reminders
        .get(SubscriberId::new(subscriber_id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("subscriber {subscriber_id}")))?;
    Ok(Json(ReminderSetDto::from(set)))
}

/// `POST /reminders/{subscriber_id}` — Track a name.
///
/// Responds `201` when the name was added and `200` when it was already
/// tracked.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] for a blank name.
#[utoipa::path(
    post,
    path = "/api/v1/reminders/{subscriber_id}",
    tag = "Reminders",
    summary = "Add reminder",
    description = "Tracks a player name for the subscriber. Names are trimmed and lowercased; adding a tracked name is a reported no-op.",
    params(
        ("subscriber_id" = i64, Path, description = "Subscriber identity"),
    ),
    request_body = AddReminderRequest,
    responses(
        (status = 201, description = "Name added", body = AddReminderResponse),
        (status = 200, description = "Already tracked", body = AddReminderResponse),
        (status = 400, description = "Blank name", body = ErrorResponse),
    )
)]
pub async fn add_reminder(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
    Json(req): Json<AddReminderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .reminders
        .add(SubscriberId::new(subscriber_id), &req.name)
        .await?;
    let status = match outcome {
        AddOutcome::Added => StatusCode::CREATED,
        AddOutcome::AlreadyTracked => StatusCode::OK,
    };
    Ok((status, Json(AddReminderResponse::new(subscriber_id, outcome))))
}

/// `DELETE /reminders/{subscriber_id}` — Drop the whole record.
///
/// # Errors
///
/// Returns a persistence error.
#[utoipa::path(
    delete,
    path = "/api/v1/reminders/{subscriber_id}",
    tag = "Reminders",
    summary = "Clear reminders",
    description = "Deletes every tracked name of the subscriber. Succeeds when there was nothing to delete.",
    params(
        ("subscriber_id" = i64, Path, description = "Subscriber identity"),
    ),
    responses(
        (status = 200, description = "Clear outcome", body = ClearRemindersResponse),
    )
)]
pub async fn clear_reminders(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .reminders
        .clear(SubscriberId::new(subscriber_id))
        .await?;
    Ok(Json(ClearRemindersResponse::from(outcome)))
}

/// `DELETE /reminders/{subscriber_id}/names/{name}` — Stop tracking a name.
///
/// # Errors
///
/// Returns a persistence error.
#[utoipa::path(
    delete,
    path = "/api/v1/reminders/{subscriber_id}/names/{name}",
    tag = "Reminders",
    summary = "Remove reminder",
    params(
        ("subscriber_id" = i64, Path, description = "Subscriber identity"),
        ("name" = String, Path, description = "Tracked name, any case"),
    ),
    responses(
        (status = 200, description = "Remove outcome", body = RemoveReminderResponse),
    )
)]
pub async fn remove_reminder(
    State(state): State<AppState>,
    Path((subscriber_id, name)): Path<(i64, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let names = BTreeSet::from([name]);
    let outcome = state
        .reminders
        .remove_names(SubscriberId::new(subscriber_id), &names)
        .await?;
    Ok(Json(RemoveReminderResponse::from(outcome)))
}

/// Reminder routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reminders", get(list_reminders))
        .route(
            "/reminders/{subscriber_id}",
            get(get_reminders)
                .post(add_reminder)
                .delete(clear_reminders),
        )
        .route(
            "/reminders/{subscriber_id}/names/{name}",
            delete(remove_reminder),
        )
}
