//! Email digest queue models.

use genera_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notification_digest_queue` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DigestQueueEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub notification_id: DbId,
    pub digest_type: String,
    pub scheduled_for: Timestamp,
    pub processed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
