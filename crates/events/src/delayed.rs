//! Release of notifications deferred by quiet hours.
//!
//! [`DelayedReleaser`] runs as a background task. Each tick it claims the
//! deferred notifications whose `scheduled_for` has passed and inserts them
//! as ordinary notifications under their original idempotency key, so a
//! release that races a retry still produces one row.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use genera_core::types::Timestamp;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchResult;
use crate::store::NotificationStore;

/// Deferred notifications claimed per tick.
const RELEASE_BATCH_SIZE: usize = 500;

// ---------------------------------------------------------------------------
// DelayedReleaser
// ---------------------------------------------------------------------------

pub struct DelayedReleaser {
    store: Arc<dyn NotificationStore>,
    poll_interval: Duration,
    batch_size: usize,
}

impl DelayedReleaser {
    pub fn new(store: Arc<dyn NotificationStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
            batch_size: RELEASE_BATCH_SIZE,
        }
    }

    /// Override the per-tick claim size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Run the release loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Delayed notification releaser cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.release_due(Utc::now()).await {
                        tracing::error!(error = %e, "Failed to release delayed notifications");
                    }
                }
            }
        }
    }

    /// Release everything due at `now`, one batch at a time.
    ///
    /// Returns the number of notification rows created. A row whose key was
    /// already delivered is counted as released but not created. A row whose
    /// insert fails goes back to pending and the pass stops, leaving it for
    /// the next tick.
    pub async fn release_due(&self, now: Timestamp) -> DispatchResult<usize> {
        let mut created = 0;

        loop {
            let batch = self.store.claim_due_delayed(now, self.batch_size).await?;
            let claimed = batch.len();
            let mut failed = 0;

            for delayed in &batch {
                match self.store.insert_notification(&delayed.to_new_notification()).await {
                    Ok(Some(_)) => created += 1,
                    Ok(None) => {
                        tracing::debug!(
                            delayed_id = delayed.id,
                            user_id = delayed.user_id,
                            "Deferred notification already delivered",
                        );
                    }
                    Err(e) => {
                        failed += 1;
                        tracing::error!(
                            error = %e,
                            delayed_id = delayed.id,
                            user_id = delayed.user_id,
                            "Failed to release deferred notification, will retry",
                        );
                        self.store.unclaim_delayed(delayed.id).await?;
                    }
                }
            }

            if claimed < self.batch_size || failed > 0 {
                break;
            }
        }

        if created > 0 {
            tracing::info!(count = created, "Released deferred notifications");
        }
        Ok(created)
    }
}
