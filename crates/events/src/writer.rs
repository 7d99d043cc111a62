//! Per-recipient notification writer.
//!
//! For one recipient: apply preferences (do-not-disturb, quiet hours,
//! per-event settings, hourly ceiling), run the duplicate guard, insert the
//! row, then queue the digest email if the user batches this event type.
//! Only a created row counts against the hourly ceiling.

use std::sync::Arc;

use chrono::FixedOffset;
use genera_core::notification::{EmailFrequency, DELAY_REASON_QUIET_HOURS};
use genera_core::preferences::{category_decision, decide, DeliveryDecision, UserPreferences};
use genera_core::types::{DbId, Timestamp};
use genera_db::models::delayed_notification::NewDelayedNotification;
use genera_db::models::notification::{NewNotification, UserNotification};

use crate::config::DispatchConfig;
use crate::content::ResolvedContent;
use crate::dedup::DedupGuard;
use crate::digest::DigestQueueWriter;
use crate::dispatcher::DispatchOptions;
use crate::error::DispatchResult;
use crate::rate_limit::RateLimiter;
use crate::store::NotificationStore;

/// One notification for one recipient.
#[derive(Debug, Clone)]
pub struct DeliveryRequest<'a> {
    pub user_id: DbId,
    pub event_type: &'a str,
    pub category: &'a str,
    pub content: &'a ResolvedContent,
    pub idempotency_key: String,
    pub options: DispatchOptions,
    pub now: Timestamp,
}

/// What happened to one delivery request. Only `Created` wrote a row.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    Created(UserNotification),
    /// The idempotency key already existed.
    AlreadyDelivered,
    /// Held back by quiet hours.
    Deferred { until: Timestamp },
    /// Do-not-disturb or every channel disabled.
    Suppressed,
    /// Over the user's hourly ceiling.
    RateLimited,
    /// Same content delivered within the dedup window.
    Duplicate,
    /// In-app disabled; email only, which the engine does not send.
    EmailOnly,
}

impl WriteOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, WriteOutcome::Created(_))
    }
}

pub struct NotificationWriter {
    store: Arc<dyn NotificationStore>,
    dedup: DedupGuard,
    rate_limiter: RateLimiter,
    digests: DigestQueueWriter,
    offset: FixedOffset,
}

impl NotificationWriter {
    pub fn new(store: Arc<dyn NotificationStore>, config: &DispatchConfig) -> Self {
        Self {
            dedup: DedupGuard::new(store.clone(), config.dedup_window),
            rate_limiter: RateLimiter::new(),
            digests: DigestQueueWriter::new(store.clone(), config.utc_offset),
            offset: config.utc_offset,
            store,
        }
    }

    /// Apply preferences and write the notification.
    ///
    /// Errors are storage failures scoped to this recipient; every policy
    /// outcome is an `Ok` variant.
    pub async fn write(&self, req: DeliveryRequest<'_>) -> DispatchResult<WriteOutcome> {
        let user_id = req.user_id;
        let prefs = self.store.preferences(user_id).await?;
        let decision = self.decision(&req, prefs.as_ref());

        let notification = NewNotification {
            user_id,
            title: req.content.title.clone(),
            description: Some(req.content.description.clone()).filter(|d| !d.is_empty()),
            category: req.category.to_string(),
            related_url: Some(req.content.url.clone()).filter(|u| !u.is_empty()),
            importance: req.content.importance,
            event_type: Some(req.event_type.to_string()),
            idempotency_key: Some(req.idempotency_key.clone()),
        };

        if let Some(until) = decision.deferred_until {
            let stored = self
                .store
                .insert_delayed(&NewDelayedNotification {
                    notification,
                    scheduled_for: until,
                    reason: DELAY_REASON_QUIET_HOURS.to_string(),
                })
                .await?;
            tracing::debug!(user_id, %until, stored, "Deferred by quiet hours");
            return Ok(WriteOutcome::Deferred { until });
        }

        if !decision.send_in_app {
            if decision.send_email {
                tracing::debug!(
                    user_id,
                    event_type = %req.event_type,
                    "In-app disabled, email-only delivery not handled by the engine",
                );
                return Ok(WriteOutcome::EmailOnly);
            }
            tracing::debug!(user_id, event_type = %req.event_type, "Suppressed by preferences");
            return Ok(WriteOutcome::Suppressed);
        }

        // Reserved before the insert; given back unless a row is created.
        let charged = match &prefs {
            Some(p) if !self.rate_limiter.try_acquire(user_id, p.max_per_hour, req.now) => {
                tracing::debug!(
                    user_id,
                    max_per_hour = p.max_per_hour,
                    recent = self.rate_limiter.recent_count(user_id, req.now),
                    "Hourly ceiling reached",
                );
                return Ok(WriteOutcome::RateLimited);
            }
            Some(_) => true,
            None => false,
        };

        let outcome = self.persist(&req, &notification).await;
        if charged && !matches!(outcome, Ok(WriteOutcome::Created(_))) {
            self.rate_limiter.release(user_id, req.now);
        }

        if let Ok(WriteOutcome::Created(row)) = &outcome {
            if decision.send_email {
                self.handle_email(row, decision.email_frequency, req.now).await;
            }
        }
        outcome
    }

    /// Duplicate guard, then the idempotent insert.
    async fn persist(
        &self,
        req: &DeliveryRequest<'_>,
        notification: &NewNotification,
    ) -> DispatchResult<WriteOutcome> {
        let user_id = req.user_id;

        if !req.options.skip_duplicate_check
            && self
                .dedup
                .is_duplicate(
                    user_id,
                    &notification.title,
                    notification.description.as_deref(),
                    req.now,
                )
                .await
        {
            tracing::debug!(user_id, title = %notification.title, "Duplicate content skipped");
            return Ok(WriteOutcome::Duplicate);
        }

        match self.store.insert_notification(notification).await? {
            Some(row) => Ok(WriteOutcome::Created(row)),
            None => {
                tracing::debug!(user_id, event_type = %req.event_type, "Already delivered");
                Ok(WriteOutcome::AlreadyDelivered)
            }
        }
    }

    fn decision(
        &self,
        req: &DeliveryRequest<'_>,
        prefs: Option<&UserPreferences>,
    ) -> DeliveryDecision {
        let mut decision = decide(
            prefs,
            req.event_type,
            req.content.importance,
            req.now,
            self.offset,
        );

        if req.options.force_immediate {
            if decision.deferred_until.is_some() {
                decision = prefs.map_or_else(DeliveryDecision::immediate, |p| {
                    category_decision(p, req.event_type)
                });
            }
            if decision.send_email {
                decision.email_frequency = EmailFrequency::Immediate;
            }
        }
        decision
    }

    /// Digest enqueue failures are logged; the in-app row stands.
    async fn handle_email(&self, row: &UserNotification, frequency: EmailFrequency, now: Timestamp) {
        match frequency {
            EmailFrequency::Daily | EmailFrequency::Weekly => {
                if let Err(e) = self.digests.enqueue(row.user_id, row.id, frequency, now).await {
                    tracing::error!(
                        error = %e,
                        user_id = row.user_id,
                        notification_id = row.id,
                        "Failed to queue digest email",
                    );
                }
            }
            EmailFrequency::Immediate => {
                tracing::debug!(
                    user_id = row.user_id,
                    notification_id = row.id,
                    "Immediate email requested, left to the mail service",
                );
            }
            EmailFrequency::Never => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use genera_core::notification::Importance;
    use genera_core::preferences::CategorySetting;

    use super::*;
    use crate::store::InMemoryNotificationStore;

    fn content(title: &str) -> ResolvedContent {
        ResolvedContent {
            title: title.to_string(),
            description: "Descripción".to_string(),
            url: "/assignments".to_string(),
            importance: Importance::Normal,
        }
    }

    /// 2025-10-17 is a Friday.
    fn noon() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 10, 17, 12, 0, 0).unwrap()
    }

    fn request<'a>(user_id: DbId, content: &'a ResolvedContent, key: &str) -> DeliveryRequest<'a> {
        DeliveryRequest {
            user_id,
            event_type: "assignment_created",
            category: "assignments",
            content,
            idempotency_key: key.to_string(),
            options: DispatchOptions::default(),
            now: noon(),
        }
    }

    fn writer(store: &Arc<InMemoryNotificationStore>) -> NotificationWriter {
        NotificationWriter::new(store.clone(), &DispatchConfig::default())
    }

    #[tokio::test]
    async fn creates_row_without_preferences() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let c = content("Nueva tarea");
        let outcome = writer(&store).write(request(1, &c, "k1")).await.unwrap();

        assert_matches!(outcome, WriteOutcome::Created(ref row) if row.user_id == 1);
        let rows = store.notifications();
        assert_eq!(rows[0].event_type.as_deref(), Some("assignment_created"));
        assert_eq!(rows[0].category, "assignments");
        assert_eq!(rows[0].idempotency_key.as_deref(), Some("k1"));
    }

    #[tokio::test]
    async fn same_key_is_already_delivered() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let w = writer(&store);
        let c = content("Nueva tarea");
        let mut second = request(1, &c, "k1");
        second.options.skip_duplicate_check = true;

        assert!(w.write(request(1, &c, "k1")).await.unwrap().is_created());
        assert_matches!(w.write(second).await.unwrap(), WriteOutcome::AlreadyDelivered);
        assert_eq!(store.notifications().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_content_is_skipped_unless_requested() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let w = writer(&store);
        let c = content("Nueva tarea");

        assert!(w.write(request(1, &c, "k1")).await.unwrap().is_created());
        assert_matches!(w.write(request(1, &c, "k2")).await.unwrap(), WriteOutcome::Duplicate);

        let mut forced = request(1, &c, "k3");
        forced.options.skip_duplicate_check = true;
        assert!(w.write(forced).await.unwrap().is_created());
    }

    #[tokio::test]
    async fn do_not_disturb_suppresses() {
        let store = Arc::new(InMemoryNotificationStore::new());
        store.set_preferences(
            1,
            UserPreferences {
                do_not_disturb: true,
                ..Default::default()
            },
        );
        let c = content("Nueva tarea");
        let outcome = writer(&store).write(request(1, &c, "k1")).await.unwrap();
        assert_matches!(outcome, WriteOutcome::Suppressed);
        assert!(store.notifications().is_empty());
    }

    #[tokio::test]
    async fn quiet_hours_defer_into_delayed_table() {
        let store = Arc::new(InMemoryNotificationStore::new());
        store.set_preferences(1, UserPreferences::default());
        let c = content("Nueva tarea");
        let mut req = request(1, &c, "k1");
        req.now = Utc.with_ymd_and_hms(2025, 10, 17, 23, 0, 0).unwrap();

        let outcome = writer(&store).write(req).await.unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 10, 18, 7, 0, 0).unwrap();
        assert_matches!(outcome, WriteOutcome::Deferred { until } if until == expected);

        let delayed = store.delayed();
        assert_eq!(delayed.len(), 1);
        assert_eq!(delayed[0].reason, "quiet_hours");
        assert_eq!(delayed[0].idempotency_key.as_deref(), Some("k1"));
        assert!(store.notifications().is_empty());
    }

    #[tokio::test]
    async fn force_immediate_bypasses_quiet_hours() {
        let store = Arc::new(InMemoryNotificationStore::new());
        store.set_preferences(1, UserPreferences::default());
        let c = content("Nueva tarea");
        let mut req = request(1, &c, "k1");
        req.now = Utc.with_ymd_and_hms(2025, 10, 17, 23, 0, 0).unwrap();
        req.options.force_immediate = true;

        assert!(writer(&store).write(req).await.unwrap().is_created());
        assert!(store.delayed().is_empty());
    }

    #[tokio::test]
    async fn daily_frequency_queues_digest() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let mut prefs = UserPreferences::default();
        prefs.notification_settings.insert(
            "assignment_created".into(),
            CategorySetting {
                frequency: EmailFrequency::Daily,
                ..Default::default()
            },
        );
        store.set_preferences(1, prefs);
        let c = content("Nueva tarea");

        let outcome = writer(&store).write(request(1, &c, "k1")).await.unwrap();
        let WriteOutcome::Created(row) = outcome else {
            panic!("expected a created row");
        };
        let digests = store.digest_entries();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].notification_id, row.id);
        assert_eq!(
            digests[0].scheduled_for,
            Utc.with_ymd_and_hms(2025, 10, 18, 9, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn force_immediate_skips_digest() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let mut prefs = UserPreferences::default();
        prefs.notification_settings.insert(
            "assignment_created".into(),
            CategorySetting {
                frequency: EmailFrequency::Weekly,
                ..Default::default()
            },
        );
        store.set_preferences(1, prefs);
        let c = content("Nueva tarea");
        let mut req = request(1, &c, "k1");
        req.options.force_immediate = true;

        assert!(writer(&store).write(req).await.unwrap().is_created());
        assert!(store.digest_entries().is_empty());
    }

    #[tokio::test]
    async fn in_app_disabled_is_email_only() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let mut prefs = UserPreferences::default();
        prefs.notification_settings.insert(
            "assignment_created".into(),
            CategorySetting {
                in_app_enabled: false,
                ..Default::default()
            },
        );
        store.set_preferences(1, prefs);
        let c = content("Nueva tarea");

        let outcome = writer(&store).write(request(1, &c, "k1")).await.unwrap();
        assert_matches!(outcome, WriteOutcome::EmailOnly);
        assert!(store.notifications().is_empty());
    }

    #[tokio::test]
    async fn hourly_ceiling_limits_rows() {
        let store = Arc::new(InMemoryNotificationStore::new());
        store.set_preferences(
            1,
            UserPreferences {
                max_per_hour: 2,
                ..Default::default()
            },
        );
        let w = writer(&store);

        let mut outcomes = Vec::new();
        for i in 0..4 {
            let c = content(&format!("Tarea {i}"));
            outcomes.push(w.write(request(1, &c, &format!("k{i}"))).await.unwrap());
        }
        assert_eq!(outcomes.iter().filter(|o| o.is_created()).count(), 2);
        assert_matches!(outcomes[3], WriteOutcome::RateLimited);
    }

    #[tokio::test]
    async fn writes_that_land_nothing_do_not_use_the_ceiling() {
        let store = Arc::new(InMemoryNotificationStore::new());
        store.set_preferences(
            1,
            UserPreferences {
                max_per_hour: 2,
                ..Default::default()
            },
        );
        let w = writer(&store);
        let first = content("Tarea 0");

        assert!(w.write(request(1, &first, "k0")).await.unwrap().is_created());
        // Same key again, and same content under a new key.
        let mut retry = request(1, &first, "k0");
        retry.options.skip_duplicate_check = true;
        assert_matches!(w.write(retry).await.unwrap(), WriteOutcome::AlreadyDelivered);
        assert_matches!(w.write(request(1, &first, "k1")).await.unwrap(), WriteOutcome::Duplicate);

        let second = content("Tarea 1");
        assert!(w.write(request(1, &second, "k2")).await.unwrap().is_created());
        let third = content("Tarea 2");
        assert_matches!(w.write(request(1, &third, "k3")).await.unwrap(), WriteOutcome::RateLimited);
        assert_eq!(store.notifications().len(), 2);
    }

    #[tokio::test]
    async fn failed_insert_gives_the_slot_back() {
        let store = Arc::new(InMemoryNotificationStore::new());
        store.set_preferences(
            1,
            UserPreferences {
                max_per_hour: 1,
                ..Default::default()
            },
        );
        store.fail_inserts_for(1);
        let w = writer(&store);
        let c = content("Nueva tarea");
        assert!(w.write(request(1, &c, "k1")).await.is_err());

        store.clear_insert_failures();
        assert!(w.write(request(1, &c, "k1")).await.unwrap().is_created());
    }

    #[tokio::test]
    async fn insert_failure_is_an_error() {
        let store = Arc::new(InMemoryNotificationStore::new());
        store.fail_inserts_for(1);
        let c = content("Nueva tarea");
        assert!(writer(&store).write(request(1, &c, "k1")).await.is_err());
    }
}
