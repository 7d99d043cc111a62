//! Repository for the `notification_events` audit log.

use genera_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification_event::{NewNotificationEvent, NotificationEventLog};

/// Column list for `notification_events` queries.
const COLUMNS: &str = "id, event_type, event_data, trigger_id, notifications_created, status, \
    error_message, processed_at";

/// Append-only access to the dispatch audit log.
pub struct NotificationEventRepo;

impl NotificationEventRepo {
    /// Append an audit record, returning its ID.
    pub async fn insert(pool: &PgPool, input: &NewNotificationEvent) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notification_events \
                (event_type, event_data, trigger_id, notifications_created, status, error_message) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(&input.event_type)
        .bind(&input.event_data)
        .bind(input.trigger_id)
        .bind(input.notifications_created)
        .bind(input.status.as_str())
        .bind(&input.error_message)
        .fetch_one(pool)
        .await
    }

    /// Most recent records for an event type.
    pub async fn list_recent_for_event(
        pool: &PgPool,
        event_type: &str,
        limit: i64,
    ) -> Result<Vec<NotificationEventLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_events \
             WHERE event_type = $1 \
             ORDER BY processed_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, NotificationEventLog>(&query)
            .bind(event_type)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
