//! Per-subscriber tracked-name storage.
//!
//! Each tracked name is one `(subscriber_id, name)` row. A subscriber's
//! record exists exactly while it has at least one row, so removing the
//! last name deletes the record without a separate cleanup step. Every
//! mutation is a single statement and therefore atomic.

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::models::ReminderRow;
use crate::domain::reminder::normalize_name;
use crate::domain::{AddOutcome, ClearOutcome, ReminderSet, SubscriberId};
use crate::error::ServiceError;

/// SQLite-backed reminder store.
#[derive(Debug, Clone)]
pub struct ReminderStore {
    pool: SqlitePool,
}

impl ReminderStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Tracks `name` for `subscriber_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] if the name is blank, or
    /// [`ServiceError::PersistenceError`] on database failure.
    pub async fn add(
        &self,
        subscriber_id: SubscriberId,
        name: &str,
    ) -> Result<AddOutcome, ServiceError> {
        let name = normalize_name(name)
            .ok_or_else(|| ServiceError::InvalidRequest("name must not be blank".to_string()))?;

        let result = sqlx::query(
            "INSERT INTO reminders (subscriber_id, name, created_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT (subscriber_id, name) DO NOTHING",
        )
        .bind(subscriber_id.get())
        .bind(&name)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(ServiceError::persistence)?;

        if result.rows_affected() == 0 {
            Ok(AddOutcome::AlreadyTracked)
        } else {
            Ok(AddOutcome::Added)
        }
    }

    /// Deletes the subscriber's whole record.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn clear(&self, subscriber_id: SubscriberId) -> Result<ClearOutcome, ServiceError> {
        let result = sqlx::query("DELETE FROM reminders WHERE subscriber_id = ?1")
            .bind(subscriber_id.get())
            .execute(&self.pool)
            .await
            .map_err(ServiceError::persistence)?;

        if result.rows_affected() == 0 {
            Ok(ClearOutcome::NoSuchSubscriber)
        } else {
            Ok(ClearOutcome::Cleared)
        }
    }

    /// Removes `names` from the subscriber's set. Returns how many were
    /// removed; unknown subscribers and untracked names are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn remove_names<'a, I>(
        &self,
        subscriber_id: SubscriberId,
        names: I,
    ) -> Result<u64, ServiceError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let normalized: Vec<String> = names
            .into_iter()
            .filter_map(|n| normalize_name(n))
            .collect();
        if normalized.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("DELETE FROM reminders WHERE subscriber_id = ");
        builder.push_bind(subscriber_id.get());
        builder.push(" AND name IN (");
        let mut separated = builder.separated(", ");
        for name in &normalized {
            separated.push_bind(name.as_str());
        }
        separated.push_unseparated(")");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(ServiceError::persistence)?;

        Ok(result.rows_affected())
    }

    /// Returns one subscriber's record, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn get(
        &self,
        subscriber_id: SubscriberId,
    ) -> Result<Option<ReminderSet>, ServiceError> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT subscriber_id, name FROM reminders WHERE subscriber_id = ?1 ORDER BY name",
        )
        .bind(subscriber_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(ServiceError::persistence)?;

        Ok(group(rows).into_iter().next())
    }

    /// Returns every record, ordered by subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn list_all(&self) -> Result<Vec<ReminderSet>, ServiceError> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT subscriber_id, name FROM reminders ORDER BY subscriber_id, name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ServiceError::persistence)?;

        Ok(group(rows))
    }
}

fn group(rows: Vec<ReminderRow>) -> Vec<ReminderSet> {
    let mut sets: BTreeMap<SubscriberId, ReminderSet> = BTreeMap::new();
    for row in rows {
        let id = SubscriberId::new(row.subscriber_id);
        sets.entry(id)
            .or_insert_with(|| ReminderSet::new(id))
            .tracked_names
            .insert(row.name);
    }
    sets.into_values().collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::sqlite::connect_in_memory;

    async fn store() -> ReminderStore {
        let Ok(pool) = connect_in_memory().await else {
            panic!("in-memory database should open");
        };
        ReminderStore::new(pool)
    }

    const ALICE_FAN: SubscriberId = SubscriberId::new(42);

    #[tokio::test]
    async fn add_normalizes_and_is_idempotent() {
        let store = store().await;
        assert!(matches!(
            store.add(ALICE_FAN, "  Alice ").await,
            Ok(AddOutcome::Added)
        ));
        assert!(matches!(
            store.add(ALICE_FAN, "ALICE").await,
            Ok(AddOutcome::AlreadyTracked)
        ));

        let Ok(Some(set)) = store.get(ALICE_FAN).await else {
            panic!("record should exist");
        };
        assert_eq!(set.tracked_names.len(), 1);
        assert!(set.tracked_names.contains("alice"));
    }

    #[tokio::test]
    async fn add_rejects_blank_name() {
        let store = store().await;
        let result = store.add(ALICE_FAN, "   ").await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn clear_reports_missing_subscriber() {
        let store = store().await;
        assert!(matches!(
            store.clear(ALICE_FAN).await,
            Ok(ClearOutcome::NoSuchSubscriber)
        ));
        assert!(store.add(ALICE_FAN, "alice").await.is_ok());
        assert!(store.add(ALICE_FAN, "bob").await.is_ok());
        assert!(matches!(
            store.clear(ALICE_FAN).await,
            Ok(ClearOutcome::Cleared)
        ));
        assert!(matches!(store.get(ALICE_FAN).await, Ok(None)));
    }

    #[tokio::test]
    async fn removing_last_name_deletes_record() {
        let store = store().await;
        assert!(store.add(ALICE_FAN, "alice").await.is_ok());
        assert!(store.add(ALICE_FAN, "bob").await.is_ok());

        let names = ["Alice".to_string()];
        assert!(matches!(store.remove_names(ALICE_FAN, &names).await, Ok(1)));
        let Ok(Some(set)) = store.get(ALICE_FAN).await else {
            panic!("record should still exist");
        };
        assert_eq!(set.tracked_names.len(), 1);

        let names = ["bob".to_string()];
        assert!(matches!(store.remove_names(ALICE_FAN, &names).await, Ok(1)));
        assert!(matches!(store.get(ALICE_FAN).await, Ok(None)));
        assert!(store.list_all().await.is_ok_and(|all| all.is_empty()));
    }

    #[tokio::test]
    async fn remove_for_unknown_subscriber_is_noop() {
        let store = store().await;
        let names = ["alice".to_string()];
        assert!(matches!(
            store.remove_names(SubscriberId::new(7), &names).await,
            Ok(0)
        ));
        let none: [String; 0] = [];
        assert!(matches!(store.remove_names(ALICE_FAN, &none).await, Ok(0)));
    }

    #[tokio::test]
    async fn list_all_groups_by_subscriber() {
        let store = store().await;
        assert!(store.add(SubscriberId::new(2), "carol").await.is_ok());
        assert!(store.add(SubscriberId::new(1), "bob").await.is_ok());
        assert!(store.add(SubscriberId::new(1), "alice").await.is_ok());

        let Ok(all) = store.list_all().await else {
            panic!("list failed");
        };
        assert_eq!(all.len(), 2);
        let Some(first) = all.first() else {
            panic!("expected a record");
        };
        assert_eq!(first.subscriber_id, SubscriberId::new(1));
        let names: Vec<&str> = first.tracked_names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }
}
