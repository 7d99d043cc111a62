use genera_core::notification::DigestType;
use genera_core::preferences::UserPreferences;
use genera_core::types::{DbId, Timestamp};
use genera_db::models::delayed_notification::{DelayedNotification, NewDelayedNotification};
use genera_db::models::notification::{NewNotification, UserNotification};
use genera_db::models::notification_event::NewNotificationEvent;
use genera_db::models::notification_trigger::NotificationTrigger;
use genera_db::repositories::{
    DelayedNotificationRepo, DigestQueueRepo, NotificationEventRepo, NotificationPreferenceRepo,
    NotificationRepo, NotificationTriggerRepo, UserRepo,
};
use genera_db::DbPool;

use super::{sql_limit, NotificationStore};
use crate::error::DispatchResult;

/// [`NotificationStore`] backed by the PostgreSQL repositories.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationStore for PgNotificationStore {
    async fn active_triggers(&self, event_type: &str) -> DispatchResult<Vec<NotificationTrigger>> {
        Ok(NotificationTriggerRepo::list_active_for_event(&self.pool, event_type).await?)
    }

    async fn active_user_page(
        &self,
        after: Option<DbId>,
        limit: usize,
    ) -> DispatchResult<Vec<DbId>> {
        Ok(UserRepo::active_ids_after(&self.pool, after, sql_limit(limit)).await?)
    }

    async fn preferences(&self, user_id: DbId) -> DispatchResult<Option<UserPreferences>> {
        let row = NotificationPreferenceRepo::find_for_user(&self.pool, user_id).await?;
        Ok(row.map(|r| r.into_preferences()))
    }

    async fn has_similar_since(
        &self,
        user_id: DbId,
        title: &str,
        description: Option<&str>,
        since: Timestamp,
    ) -> DispatchResult<bool> {
        Ok(
            NotificationRepo::exists_similar_since(&self.pool, user_id, title, description, since)
                .await?,
        )
    }

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> DispatchResult<Option<UserNotification>> {
        Ok(NotificationRepo::insert_if_absent(&self.pool, notification).await?)
    }

    async fn insert_delayed(&self, delayed: &NewDelayedNotification) -> DispatchResult<bool> {
        let id = DelayedNotificationRepo::insert_if_absent(&self.pool, delayed).await?;
        Ok(id.is_some())
    }

    async fn claim_due_delayed(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> DispatchResult<Vec<DelayedNotification>> {
        Ok(DelayedNotificationRepo::claim_due(&self.pool, now, sql_limit(limit)).await?)
    }

    async fn unclaim_delayed(&self, delayed_id: DbId) -> DispatchResult<()> {
        DelayedNotificationRepo::unclaim(&self.pool, delayed_id).await?;
        Ok(())
    }

    async fn enqueue_digest(
        &self,
        user_id: DbId,
        notification_id: DbId,
        digest_type: DigestType,
        scheduled_for: Timestamp,
    ) -> DispatchResult<bool> {
        Ok(DigestQueueRepo::enqueue(
            &self.pool,
            user_id,
            notification_id,
            digest_type,
            scheduled_for,
        )
        .await?)
    }

    async fn record_event(&self, event: &NewNotificationEvent) -> DispatchResult<()> {
        NotificationEventRepo::insert(&self.pool, event).await?;
        Ok(())
    }
}
