//! Dispatch audit log models.

use genera_core::notification::DispatchStatus;
use genera_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notification_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationEventLog {
    pub id: DbId,
    pub event_type: String,
    pub event_data: serde_json::Value,
    pub trigger_id: Option<DbId>,
    pub notifications_created: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub processed_at: Timestamp,
}

/// DTO for appending an audit record.
#[derive(Debug, Clone)]
pub struct NewNotificationEvent {
    pub event_type: String,
    pub event_data: serde_json::Value,
    pub trigger_id: Option<DbId>,
    pub notifications_created: i32,
    pub status: DispatchStatus,
    pub error_message: Option<String>,
}
