//! Repository for the `user_notifications` table.

use genera_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::notification::{NewNotification, UserNotification};

/// Column list for `user_notifications` queries.
const COLUMNS: &str = "id, user_id, title, description, category, related_url, importance, \
    event_type, idempotency_key, is_read, read_at, created_at";

/// Provides write and lookup operations for in-app notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification unless its idempotency key already exists.
    ///
    /// Returns `None` when the key collided: the notification was already
    /// delivered and nothing was written.
    pub async fn insert_if_absent(
        pool: &PgPool,
        input: &NewNotification,
    ) -> Result<Option<UserNotification>, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_notifications \
                (user_id, title, description, category, related_url, importance, \
                 event_type, idempotency_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_user_notifications_idempotency_key DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserNotification>(&query)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.related_url)
            .bind(input.importance.as_str())
            .bind(&input.event_type)
            .bind(&input.idempotency_key)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user already has a notification with this title (and
    /// description, when given) created at or after `since`.
    pub async fn exists_similar_since(
        pool: &PgPool,
        user_id: DbId,
        title: &str,
        description: Option<&str>,
        since: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                SELECT 1 FROM user_notifications \
                WHERE user_id = $1 \
                  AND title = $2 \
                  AND ($3::TEXT IS NULL OR description = $3) \
                  AND created_at >= $4 \
             )",
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Find a notification by its idempotency key.
    pub async fn find_by_idempotency_key(
        pool: &PgPool,
        key: &str,
    ) -> Result<Option<UserNotification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_notifications WHERE idempotency_key = $1");
        sqlx::query_as::<_, UserNotification>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List a user's notifications, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<UserNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_notifications \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, UserNotification>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark a notification read. `read_at` is the only mutable column.
    ///
    /// Returns `true` if an unread notification owned by the user was updated.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
