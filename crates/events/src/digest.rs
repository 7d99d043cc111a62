//! Email digest queue writer.

use std::sync::Arc;

use chrono::FixedOffset;
use genera_core::digest::next_digest_time;
use genera_core::notification::EmailFrequency;
use genera_core::types::{DbId, Timestamp};

use crate::error::DispatchResult;
use crate::store::NotificationStore;

/// Queues created notifications for the daily or weekly digest email.
pub struct DigestQueueWriter {
    store: Arc<dyn NotificationStore>,
    offset: FixedOffset,
}

impl DigestQueueWriter {
    pub fn new(store: Arc<dyn NotificationStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Queue `notification_id` when `frequency` batches into a digest.
    ///
    /// Returns `true` if an entry was written. Immediate and never
    /// frequencies, and notifications already queued, write nothing.
    pub async fn enqueue(
        &self,
        user_id: DbId,
        notification_id: DbId,
        frequency: EmailFrequency,
        now: Timestamp,
    ) -> DispatchResult<bool> {
        let Some(digest_type) = frequency.digest_type() else {
            return Ok(false);
        };
        let scheduled_for = next_digest_time(digest_type, now, self.offset);
        let queued = self
            .store
            .enqueue_digest(user_id, notification_id, digest_type, scheduled_for)
            .await?;
        if queued {
            tracing::debug!(
                user_id,
                notification_id,
                digest_type = digest_type.as_str(),
                %scheduled_for,
                "Notification queued for digest",
            );
        }
        Ok(queued)
    }
}
