//! Repository for the `notification_triggers` table.

use sqlx::PgPool;

use crate::models::notification_trigger::{CreateNotificationTrigger, NotificationTrigger};

/// Column list for `notification_triggers` queries.
const COLUMNS: &str = "id, event_type, category, notification_template, trigger_condition, \
    is_active, created_at, updated_at";

/// Read access to notification triggers. Triggers are administered elsewhere;
/// `create` exists for seeding.
pub struct NotificationTriggerRepo;

impl NotificationTriggerRepo {
    /// Active triggers for an event type, oldest first.
    pub async fn list_active_for_event(
        pool: &PgPool,
        event_type: &str,
    ) -> Result<Vec<NotificationTrigger>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_triggers \
             WHERE event_type = $1 AND is_active = true \
             ORDER BY id"
        );
        sqlx::query_as::<_, NotificationTrigger>(&query)
            .bind(event_type)
            .fetch_all(pool)
            .await
    }

    /// Insert a trigger, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotificationTrigger,
    ) -> Result<NotificationTrigger, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_triggers \
                (event_type, category, notification_template, is_active) \
             VALUES ($1, $2, $3, COALESCE($4, true)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationTrigger>(&query)
            .bind(&input.event_type)
            .bind(&input.category)
            .bind(&input.notification_template)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }
}
