//! Repository for the `notification_digest_queue` table.

use genera_core::notification::DigestType;
use genera_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::digest_queue::DigestQueueEntry;

/// Column list for `notification_digest_queue` queries.
const COLUMNS: &str =
    "id, user_id, notification_id, digest_type, scheduled_for, processed_at, created_at";

/// Enqueues notifications for email digests.
pub struct DigestQueueRepo;

impl DigestQueueRepo {
    /// Queue a notification for a digest. A notification is queued at most
    /// once; returns `false` when it was already queued.
    pub async fn enqueue(
        pool: &PgPool,
        user_id: DbId,
        notification_id: DbId,
        digest_type: DigestType,
        scheduled_for: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notification_digest_queue \
                (user_id, notification_id, digest_type, scheduled_for) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_notification_digest_queue_notification DO NOTHING",
        )
        .bind(user_id)
        .bind(notification_id)
        .bind(digest_type.as_str())
        .bind(scheduled_for)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pending entries for a user, soonest first.
    pub async fn list_pending_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DigestQueueEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_digest_queue \
             WHERE user_id = $1 AND processed_at IS NULL \
             ORDER BY scheduled_for, id"
        );
        sqlx::query_as::<_, DigestQueueEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
