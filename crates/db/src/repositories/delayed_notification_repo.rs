//! Repository for the `delayed_notifications` table.

use genera_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::delayed_notification::{DelayedNotification, NewDelayedNotification};

/// Column list for `delayed_notifications` queries.
const COLUMNS: &str = "id, user_id, title, description, category, related_url, importance, \
    event_type, idempotency_key, scheduled_for, reason, released_at, created_at";

/// Stores and releases notifications held back by quiet hours.
pub struct DelayedNotificationRepo;

impl DelayedNotificationRepo {
    /// Store a deferred notification. Returns `None` if one with the same
    /// idempotency key is already waiting.
    pub async fn insert_if_absent(
        pool: &PgPool,
        input: &NewDelayedNotification,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let n = &input.notification;
        sqlx::query_scalar(
            "INSERT INTO delayed_notifications \
                (user_id, title, description, category, related_url, importance, \
                 event_type, idempotency_key, scheduled_for, reason) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT ON CONSTRAINT uq_delayed_notifications_idempotency_key DO NOTHING \
             RETURNING id",
        )
        .bind(n.user_id)
        .bind(&n.title)
        .bind(&n.description)
        .bind(&n.category)
        .bind(&n.related_url)
        .bind(n.importance.as_str())
        .bind(&n.event_type)
        .bind(&n.idempotency_key)
        .bind(input.scheduled_for)
        .bind(&input.reason)
        .fetch_optional(pool)
        .await
    }

    /// Atomically mark up to `limit` due rows as released and return them.
    ///
    /// `SKIP LOCKED` lets several releasers run without claiming the same row.
    pub async fn claim_due(
        pool: &PgPool,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<DelayedNotification>, sqlx::Error> {
        let query = format!(
            "UPDATE delayed_notifications SET released_at = NOW() \
             WHERE id IN ( \
                SELECT id FROM delayed_notifications \
                WHERE released_at IS NULL AND scheduled_for <= $1 \
                ORDER BY scheduled_for, id \
                LIMIT $2 \
                FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DelayedNotification>(&query)
            .bind(now)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Clear `released_at` on a claimed row whose release failed. Returns
    /// `true` if the row was found.
    pub async fn unclaim(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE delayed_notifications SET released_at = NULL WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Rows still waiting for release, soonest first.
    pub async fn list_pending_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DelayedNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM delayed_notifications \
             WHERE user_id = $1 AND released_at IS NULL \
             ORDER BY scheduled_for, id"
        );
        sqlx::query_as::<_, DelayedNotification>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
