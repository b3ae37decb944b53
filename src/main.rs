//! lobbywatch server entry point.
//!
//! Opens the store, starts the poll scheduler, and serves the REST and
//! WebSocket endpoints until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use lobbywatch::api;
use lobbywatch::app_state::AppState;
use lobbywatch::config::{LogFormat, ServiceConfig};
use lobbywatch::domain::EventBus;
use lobbywatch::notify::{BroadcastNotifier, Notifier, WebhookNotifier};
use lobbywatch::persistence::{HourlyAverageStore, ReminderStore, SnapshotStore, sqlite};
use lobbywatch::service::{
    Aggregator, LobbyService, ReminderMatcher, ReminderService, SchedulerConfig, SchedulerContext,
};
use lobbywatch::source::HttpLobbySource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServiceConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting lobbywatch");

    // Persistence
    let pool = sqlite::connect(&config.database_url, config.database_max_connections)
        .await
        .context("opening database")?;
    sqlite::migrate(&pool).await.context("running migrations")?;

    let snapshots = SnapshotStore::new(pool.clone());
    let hourly = HourlyAverageStore::new(pool.clone());
    let reminder_store = ReminderStore::new(pool);

    // Services
    let event_bus = EventBus::new(config.event_bus_capacity);
    let lobby = LobbyService::new(snapshots.clone());
    let aggregator = Aggregator::new(snapshots.clone(), hourly, event_bus.clone());
    let reminders = Arc::new(ReminderService::new(reminder_store));

    match aggregator.aggregate_hourly(Utc::now()).await {
        Ok(written) => tracing::info!(buckets = written.len(), "startup aggregation done"),
        Err(e) => tracing::warn!(error = %e, "startup aggregation failed; retried by scheduler"),
    }

    // Scheduler
    let source = HttpLobbySource::new(config.source_url.clone(), config.source_timeout)
        .context("building lobby source")?;
    let parts = SchedulerParts {
        config: config.scheduler(),
        snapshots,
        lobby: lobby.clone(),
        aggregator: aggregator.clone(),
        reminders: Arc::clone(&reminders),
        event_bus: event_bus.clone(),
    };
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = match &config.notify_webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "reminders delivered via webhook");
            let notifier = WebhookNotifier::new(url.clone(), config.source_timeout)
                .context("building webhook notifier")?;
            spawn_scheduler(parts, notifier, source, shutdown_rx)
        }
        None => {
            tracing::info!("reminders delivered via websocket feed");
            let notifier = BroadcastNotifier::new(event_bus.clone());
            spawn_scheduler(parts, notifier, source, shutdown_rx)
        }
    };

    // Build application state
    let app_state = AppState {
        lobby,
        aggregator,
        reminders,
        event_bus,
    };

    // Build router
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    // Let the scheduler finish its current tick
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler.await {
        tracing::error!(error = %e, "scheduler task failed");
    }
    tracing::info!("shutdown complete");

    Ok(())
}

/// Everything the scheduler needs apart from its notifier.
struct SchedulerParts {
    config: SchedulerConfig,
    snapshots: SnapshotStore,
    lobby: LobbyService,
    aggregator: Aggregator,
    reminders: Arc<ReminderService>,
    event_bus: EventBus,
}

fn spawn_scheduler<N: Notifier + 'static>(
    parts: SchedulerParts,
    notifier: N,
    source: HttpLobbySource,
    shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let matcher = ReminderMatcher::new(parts.reminders, notifier);
    let context = SchedulerContext::new(
        parts.config,
        parts.snapshots,
        parts.lobby,
        parts.aggregator,
        matcher,
        parts.event_bus,
    );
    tokio::spawn(context.run(source, shutdown))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
