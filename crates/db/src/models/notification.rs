//! In-app notification models.

use genera_core::notification::Importance;
use genera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserNotification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub related_url: Option<String>,
    pub importance: String,
    pub event_type: Option<String>,
    pub idempotency_key: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A fully rendered notification ready to be inserted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewNotification {
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub related_url: Option<String>,
    pub importance: Importance,
    pub event_type: Option<String>,
    pub idempotency_key: Option<String>,
}
