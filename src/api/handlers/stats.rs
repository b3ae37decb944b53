//! Player-count statistics: hour and day averages, stored hourly table.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;

use crate::api::dto::{
    HourlyAverageDto, HourlyAverageListResponse, ListMeta, RangeParams, WindowAverageResponse,
};
use crate::app_state::AppState;
use crate::domain::TimeWindow;
use crate::error::{ErrorResponse, ServiceError};

/// `GET /stats/hour/{hour_start}` — Average over one hour.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] when `hour_start` is not on an
/// hour boundary or the hour runs past the end of the timestamp range.
#[utoipa::path(
    get,
    path = "/api/v1/stats/hour/{hour_start}",
    tag = "Stats",
    summary = "Hour average",
    description = "Average of per-snapshot player totals over [hour_start, hour_start + 3599]. A window without snapshots reports has_data = false.",
    params(
        ("hour_start" = i64, Path, description = "Hour start, seconds since the epoch"),
    ),
    responses(
        (status = 200, description = "Hour average", body = WindowAverageResponse),
        (status = 400, description = "Not a representable hour boundary", body = ErrorResponse),
    )
)]
pub async fn hour_average(
    State(state): State<AppState>,
    Path(hour_start): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let Some(window) = TimeWindow::aligned_hour(hour_start) else {
        return Err(ServiceError::InvalidRequest(format!(
            "{hour_start} is not a representable hour boundary"
        )));
    };
    let average = state.aggregator.average_over_window(window).await?;
    Ok(Json(WindowAverageResponse::new(window, average)))
}

/// `GET /stats/day/{date}` — Average over one UTC day.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] for a malformed date.
#[utoipa::path(
    get,
    path = "/api/v1/stats/day/{date}",
    tag = "Stats",
    summary = "Day average",
    description = "Average of per-snapshot player totals over the UTC day.",
    params(
        ("date" = String, Path, description = "Day as YYYY-MM-DD"),
    ),
    responses(
        (status = 200, description = "Day average", body = WindowAverageResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
    )
)]
pub async fn day_average(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| ServiceError::InvalidRequest(format!("invalid date {date:?}: {e}")))?;
    let average = state.aggregator.average_over_day(day).await?;
    Ok(Json(WindowAverageResponse::new(TimeWindow::day(day), average)))
}

/// `GET /stats/hourly?from&to` — Stored hourly averages.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] when `from > to`.
#[utoipa::path(
    get,
    path = "/api/v1/stats/hourly",
    tag = "Stats",
    summary = "Stored hourly averages",
    description = "Rows of the hourly-average table with from <= hour_start <= to. Hours without snapshots have no row.",
    params(RangeParams),
    responses(
        (status = 200, description = "Hourly averages", body = HourlyAverageListResponse),
        (status = 400, description = "Inverted range", body = ErrorResponse),
    )
)]
pub async fn hourly_averages(
    State(state): State<AppState>,
    Query(range): Query<RangeParams>,
) -> Result<impl IntoResponse, ServiceError> {
    if range.from > range.to {
        return Err(ServiceError::InvalidRequest(format!(
            "range start {} is after end {}",
            range.from, range.to
        )));
    }
    let rows = state.aggregator.hourly_range(range.from, range.to).await?;
    let data: Vec<HourlyAverageDto> = rows.into_iter().map(HourlyAverageDto::from).collect();
    Ok(Json(HourlyAverageListResponse {
        meta: ListMeta { count: data.len() },
        data,
    }))
}

/// Statistics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats/hour/{hour_start}", get(hour_average))
        .route("/stats/day/{date}", get(day_average))
        .route("/stats/hourly", get(hourly_averages))
}
