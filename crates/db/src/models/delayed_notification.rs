//! Notifications deferred by quiet hours.

use genera_core::notification::Importance;
use genera_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::notification::NewNotification;

/// A row from the `delayed_notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DelayedNotification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub related_url: Option<String>,
    pub importance: String,
    pub event_type: Option<String>,
    pub idempotency_key: Option<String>,
    pub scheduled_for: Timestamp,
    pub reason: String,
    pub released_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl DelayedNotification {
    /// The notification to insert once this row is due.
    pub fn to_new_notification(&self) -> NewNotification {
        NewNotification {
            user_id: self.user_id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            related_url: self.related_url.clone(),
            importance: Importance::parse(&self.importance).unwrap_or_default(),
            event_type: self.event_type.clone(),
            idempotency_key: self.idempotency_key.clone(),
        }
    }
}

/// DTO for deferring a rendered notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDelayedNotification {
    pub notification: NewNotification,
    pub scheduled_for: Timestamp,
    pub reason: String,
}
