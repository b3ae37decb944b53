//! Persistence layer: SQLite snapshot, hourly-average and reminder stores.
//!
//! Three independent tables, each owned by one store type. All stores wrap
//! a shared `sqlx::SqlitePool` and are cheap to clone. The schema is
//! created by the embedded migrations in `migrations/`.

pub mod hourly;
pub mod models;
pub mod reminders;
pub mod snapshots;
pub mod sqlite;

pub use hourly::HourlyAverageStore;
pub use models::HourlyAverage;
pub use reminders::ReminderStore;
pub use snapshots::SnapshotStore;
