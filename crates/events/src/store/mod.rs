//! Storage seam for the dispatch engine.
//!
//! The engine talks to persistence only through [`NotificationStore`], so the
//! same orchestration runs against PostgreSQL in production and against
//! [`InMemoryNotificationStore`] in tests and local runs.

mod memory;
mod postgres;

use genera_core::notification::DigestType;
use genera_core::preferences::UserPreferences;
use genera_core::types::{DbId, Timestamp};
use genera_db::models::delayed_notification::{DelayedNotification, NewDelayedNotification};
use genera_db::models::notification::{NewNotification, UserNotification};
use genera_db::models::notification_event::NewNotificationEvent;
use genera_db::models::notification_trigger::NotificationTrigger;

pub use memory::InMemoryNotificationStore;
pub use postgres::PgNotificationStore;

use crate::error::DispatchResult;

#[async_trait::async_trait]
pub trait NotificationStore: Send + Sync {
    /// Active triggers for an event type, in a stable order.
    async fn active_triggers(&self, event_type: &str) -> DispatchResult<Vec<NotificationTrigger>>;

    /// One keyset page of active user IDs greater than `after`, ascending.
    async fn active_user_page(&self, after: Option<DbId>, limit: usize)
        -> DispatchResult<Vec<DbId>>;

    async fn preferences(&self, user_id: DbId) -> DispatchResult<Option<UserPreferences>>;

    /// Whether a notification with this title (and description, when given)
    /// was created for the user at or after `since`.
    async fn has_similar_since(
        &self,
        user_id: DbId,
        title: &str,
        description: Option<&str>,
        since: Timestamp,
    ) -> DispatchResult<bool>;

    /// Insert unless the idempotency key exists. `None` means the key
    /// collided and nothing was written.
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> DispatchResult<Option<UserNotification>>;

    /// Store a deferred notification. Returns `false` if one with the same
    /// idempotency key is already waiting.
    async fn insert_delayed(&self, delayed: &NewDelayedNotification) -> DispatchResult<bool>;

    /// Mark up to `limit` due deferred notifications released and return them.
    async fn claim_due_delayed(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> DispatchResult<Vec<DelayedNotification>>;

    /// Return a claimed deferred notification to the pending set so a later
    /// release retries it.
    async fn unclaim_delayed(&self, delayed_id: DbId) -> DispatchResult<()>;

    /// Queue a notification for an email digest. Returns `false` if it was
    /// already queued.
    async fn enqueue_digest(
        &self,
        user_id: DbId,
        notification_id: DbId,
        digest_type: DigestType,
        scheduled_for: Timestamp,
    ) -> DispatchResult<bool>;

    async fn record_event(&self, event: &NewNotificationEvent) -> DispatchResult<()>;
}

/// Convert a `usize` limit into the `i64` Postgres expects.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
