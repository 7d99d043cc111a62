//! Dispatch audit trail.

use std::sync::Arc;

use genera_core::notification::DispatchStatus;
use genera_core::types::{DbId, EventData};
use genera_db::models::notification_event::NewNotificationEvent;

use crate::store::NotificationStore;

/// Appends one `notification_events` record per dispatch invocation.
/// Failures are logged and never reach the caller.
pub struct AuditLogger {
    store: Arc<dyn NotificationStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        event_type: &str,
        data: &EventData,
        trigger_id: Option<DbId>,
        notifications_created: usize,
        status: DispatchStatus,
        error_message: Option<String>,
    ) {
        let event = NewNotificationEvent {
            event_type: event_type.to_string(),
            event_data: serde_json::Value::Object(data.clone()),
            trigger_id,
            notifications_created: i32::try_from(notifications_created).unwrap_or(i32::MAX),
            status,
            error_message,
        };

        if let Err(e) = self.store.record_event(&event).await {
            tracing::error!(
                error = %e,
                event_type = %event_type,
                "Failed to record notification event",
            );
        }
    }
}
