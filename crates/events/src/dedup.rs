//! Best-effort duplicate-content guard.
//!
//! Catches near-duplicates that carry different idempotency keys (for
//! example the same message announced by two code paths). It is a courtesy
//! check: the unique idempotency key in storage is what guarantees
//! at-most-once delivery.

use std::sync::Arc;

use genera_core::types::{DbId, Timestamp};

use crate::store::NotificationStore;

pub struct DedupGuard {
    store: Arc<dyn NotificationStore>,
    window: chrono::Duration,
}

impl DedupGuard {
    pub fn new(store: Arc<dyn NotificationStore>, window: chrono::Duration) -> Self {
        Self { store, window }
    }

    /// Whether the user already got this title (and description, when
    /// given) within the trailing window ending at `now`.
    ///
    /// Lookup failures are logged and treated as "not a duplicate".
    pub async fn is_duplicate(
        &self,
        user_id: DbId,
        title: &str,
        description: Option<&str>,
        now: Timestamp,
    ) -> bool {
        let since = now - self.window;
        match self
            .store
            .has_similar_since(user_id, title, description, since)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Duplicate check failed, continuing");
                false
            }
        }
    }
}
