use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use genera_core::notification::DigestType;
use genera_core::preferences::UserPreferences;
use genera_core::types::{DbId, Timestamp};
use genera_db::models::delayed_notification::{DelayedNotification, NewDelayedNotification};
use genera_db::models::digest_queue::DigestQueueEntry;
use genera_db::models::notification::{NewNotification, UserNotification};
use genera_db::models::notification_event::{NewNotificationEvent, NotificationEventLog};
use genera_db::models::notification_trigger::NotificationTrigger;

use super::NotificationStore;
use crate::error::{DispatchError, DispatchResult};

#[derive(Default)]
struct State {
    next_id: DbId,
    users: Vec<(DbId, bool)>,
    triggers: Vec<NotificationTrigger>,
    preferences: HashMap<DbId, UserPreferences>,
    notifications: Vec<UserNotification>,
    delayed: Vec<DelayedNotification>,
    digests: Vec<DigestQueueEntry>,
    events: Vec<NotificationEventLog>,
    page_requests: Vec<Option<DbId>>,
    failing_inserts: HashSet<DbId>,
    fail_trigger_lookups: bool,
    fail_user_pages: bool,
    fail_audit: bool,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// [`NotificationStore`] held in process memory.
///
/// Enforces the same uniqueness rules as the database (idempotency keys,
/// one digest entry per notification) and records broadcast page requests
/// so tests can observe pagination. Failures can be injected per operation.
#[derive(Default)]
pub struct InMemoryNotificationStore {
    state: Mutex<State>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Seeding ------------------------------------------------------------

    /// Add a user, returning its ID. IDs ascend in insertion order.
    pub fn add_user(&self, is_active: bool) -> DbId {
        let mut state = self.state();
        let id = state.next_id();
        state.users.push((id, is_active));
        id
    }

    /// Add `count` active users.
    pub fn add_users(&self, count: usize) -> Vec<DbId> {
        (0..count).map(|_| self.add_user(true)).collect()
    }

    /// Add an active trigger with the given JSON template.
    pub fn add_trigger(
        &self,
        event_type: &str,
        category: &str,
        template: serde_json::Value,
    ) -> DbId {
        let mut state = self.state();
        let id = state.next_id();
        let now = Utc::now();
        state.triggers.push(NotificationTrigger {
            id,
            event_type: event_type.to_string(),
            category: category.to_string(),
            notification_template: template,
            trigger_condition: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn deactivate_trigger(&self, trigger_id: DbId) {
        if let Some(t) = self.state().triggers.iter_mut().find(|t| t.id == trigger_id) {
            t.is_active = false;
        }
    }

    pub fn set_preferences(&self, user_id: DbId, preferences: UserPreferences) {
        self.state().preferences.insert(user_id, preferences);
    }

    /// Shift every stored notification's `created_at` into the past.
    pub fn age_notifications(&self, by: chrono::Duration) {
        for n in self.state().notifications.iter_mut() {
            n.created_at -= by;
        }
    }

    // -- Failure injection --------------------------------------------------

    pub fn fail_inserts_for(&self, user_id: DbId) {
        self.state().failing_inserts.insert(user_id);
    }

    pub fn clear_insert_failures(&self) {
        self.state().failing_inserts.clear();
    }

    pub fn fail_trigger_lookups(&self, fail: bool) {
        self.state().fail_trigger_lookups = fail;
    }

    pub fn fail_user_pages(&self, fail: bool) {
        self.state().fail_user_pages = fail;
    }

    pub fn fail_audit(&self, fail: bool) {
        self.state().fail_audit = fail;
    }

    // -- Inspection ---------------------------------------------------------

    pub fn notifications(&self) -> Vec<UserNotification> {
        self.state().notifications.clone()
    }

    pub fn notifications_for(&self, user_id: DbId) -> Vec<UserNotification> {
        self.state()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn delayed(&self) -> Vec<DelayedNotification> {
        self.state().delayed.clone()
    }

    pub fn digest_entries(&self) -> Vec<DigestQueueEntry> {
        self.state().digests.clone()
    }

    pub fn events(&self) -> Vec<NotificationEventLog> {
        self.state().events.clone()
    }

    /// The `after` cursor of every broadcast page request, in order.
    pub fn page_requests(&self) -> Vec<Option<DbId>> {
        self.state().page_requests.clone()
    }
}

fn injected(what: &str) -> DispatchError {
    DispatchError::Store(format!("injected failure: {what}"))
}

#[async_trait::async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn active_triggers(&self, event_type: &str) -> DispatchResult<Vec<NotificationTrigger>> {
        let state = self.state();
        if state.fail_trigger_lookups {
            return Err(injected("trigger lookup"));
        }
        Ok(state
            .triggers
            .iter()
            .filter(|t| t.is_active && t.event_type == event_type)
            .cloned()
            .collect())
    }

    async fn active_user_page(
        &self,
        after: Option<DbId>,
        limit: usize,
    ) -> DispatchResult<Vec<DbId>> {
        let mut state = self.state();
        if state.fail_user_pages {
            return Err(injected("user page"));
        }
        state.page_requests.push(after);
        let mut ids: Vec<DbId> = state
            .users
            .iter()
            .filter(|(id, active)| *active && after.map_or(true, |a| *id > a))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids.truncate(limit);
        Ok(ids)
    }

    async fn preferences(&self, user_id: DbId) -> DispatchResult<Option<UserPreferences>> {
        Ok(self.state().preferences.get(&user_id).cloned())
    }

    async fn has_similar_since(
        &self,
        user_id: DbId,
        title: &str,
        description: Option<&str>,
        since: Timestamp,
    ) -> DispatchResult<bool> {
        Ok(self.state().notifications.iter().any(|n| {
            n.user_id == user_id
                && n.title == title
                && description.map_or(true, |d| n.description.as_deref() == Some(d))
                && n.created_at >= since
        }))
    }

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> DispatchResult<Option<UserNotification>> {
        let mut state = self.state();
        if state.failing_inserts.contains(&notification.user_id) {
            return Err(injected("notification insert"));
        }
        if let Some(key) = &notification.idempotency_key {
            if state
                .notifications
                .iter()
                .any(|n| n.idempotency_key.as_ref() == Some(key))
            {
                return Ok(None);
            }
        }

        let row = UserNotification {
            id: state.next_id(),
            user_id: notification.user_id,
            title: notification.title.clone(),
            description: notification.description.clone(),
            category: notification.category.clone(),
            related_url: notification.related_url.clone(),
            importance: notification.importance.as_str().to_string(),
            event_type: notification.event_type.clone(),
            idempotency_key: notification.idempotency_key.clone(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        state.notifications.push(row.clone());
        Ok(Some(row))
    }

    async fn insert_delayed(&self, delayed: &NewDelayedNotification) -> DispatchResult<bool> {
        let mut state = self.state();
        let n = &delayed.notification;
        if let Some(key) = &n.idempotency_key {
            if state
                .delayed
                .iter()
                .any(|d| d.idempotency_key.as_ref() == Some(key))
            {
                return Ok(false);
            }
        }

        let row = DelayedNotification {
            id: state.next_id(),
            user_id: n.user_id,
            title: n.title.clone(),
            description: n.description.clone(),
            category: n.category.clone(),
            related_url: n.related_url.clone(),
            importance: n.importance.as_str().to_string(),
            event_type: n.event_type.clone(),
            idempotency_key: n.idempotency_key.clone(),
            scheduled_for: delayed.scheduled_for,
            reason: delayed.reason.clone(),
            released_at: None,
            created_at: Utc::now(),
        };
        state.delayed.push(row);
        Ok(true)
    }

    async fn claim_due_delayed(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> DispatchResult<Vec<DelayedNotification>> {
        let mut state = self.state();
        let mut due: Vec<&mut DelayedNotification> = state
            .delayed
            .iter_mut()
            .filter(|d| d.released_at.is_none() && d.scheduled_for <= now)
            .collect();
        due.sort_by_key(|d| (d.scheduled_for, d.id));

        let released_at = Utc::now();
        Ok(due
            .into_iter()
            .take(limit)
            .map(|d| {
                d.released_at = Some(released_at);
                d.clone()
            })
            .collect())
    }

    async fn unclaim_delayed(&self, delayed_id: DbId) -> DispatchResult<()> {
        if let Some(d) = self.state().delayed.iter_mut().find(|d| d.id == delayed_id) {
            d.released_at = None;
        }
        Ok(())
    }

    async fn enqueue_digest(
        &self,
        user_id: DbId,
        notification_id: DbId,
        digest_type: DigestType,
        scheduled_for: Timestamp,
    ) -> DispatchResult<bool> {
        let mut state = self.state();
        if state
            .digests
            .iter()
            .any(|e| e.notification_id == notification_id)
        {
            return Ok(false);
        }
        let id = state.next_id();
        state.digests.push(DigestQueueEntry {
            id,
            user_id,
            notification_id,
            digest_type: digest_type.as_str().to_string(),
            scheduled_for,
            processed_at: None,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn record_event(&self, event: &NewNotificationEvent) -> DispatchResult<()> {
        let mut state = self.state();
        if state.fail_audit {
            return Err(injected("audit"));
        }
        let id = state.next_id();
        state.events.push(NotificationEventLog {
            id,
            event_type: event.event_type.clone(),
            event_data: event.event_data.clone(),
            trigger_id: event.trigger_id,
            notifications_created: event.notifications_created,
            status: event.status.as_str().to_string(),
            error_message: event.error_message.clone(),
            processed_at: Utc::now(),
        });
        Ok(())
    }
}
