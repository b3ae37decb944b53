//! REST endpoint handlers organized by resource.

pub mod lobby;
pub mod reminders;
pub mod snapshots;
pub mod stats;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(snapshots::routes())
        .merge(lobby::routes())
        .merge(stats::routes())
        .merge(reminders::routes())
}
