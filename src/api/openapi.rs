//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    AddReminderRequest, AddReminderResponse, ClearRemindersResponse, HourlyAverageDto,
    HourlyAverageListResponse, ListMeta, LobbyResponse, ReminderListResponse, ReminderSetDto,
    RemoveReminderResponse, SessionDto, SnapshotDto, SnapshotListResponse, VersionGroupDto,
    WindowAverageResponse,
};
use super::handlers::{lobby, reminders, snapshots, stats, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI document, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "lobbywatch",
        description = "Lobby telemetry: snapshots, player-count averages and name reminders."
    ),
    paths(
        system::health_handler,
        snapshots::latest_snapshot,
        snapshots::list_snapshots,
        lobby::lobby,
        stats::hour_average,
        stats::day_average,
        stats::hourly_averages,
        reminders::list_reminders,
        reminders::get_reminders,
        reminders::add_reminder,
        reminders::clear_reminders,
        reminders::remove_reminder,
    ),
    components(schemas(
        system::HealthResponse,
        SessionDto,
        SnapshotDto,
        SnapshotListResponse,
        ListMeta,
        VersionGroupDto,
        LobbyResponse,
        WindowAverageResponse,
        HourlyAverageDto,
        HourlyAverageListResponse,
        ReminderSetDto,
        ReminderListResponse,
        AddReminderRequest,
        AddReminderResponse,
        ClearRemindersResponse,
        RemoveReminderResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Service health"),
        (name = "Snapshots", description = "Captured lobby listings"),
        (name = "Lobby", description = "Version-grouped lobby view"),
        (name = "Stats", description = "Player-count averages"),
        (name = "Reminders", description = "Name reminders per subscriber"),
    )
)]
pub struct ApiDoc;
