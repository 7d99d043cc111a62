//! Dispatch orchestration.
//!
//! [`NotificationDispatcher::dispatch`] is the single entry point that turns
//! a domain event into per-user notifications: look up triggers, render
//! content per trigger, then stream recipients batch by batch, handing each
//! recipient to the [`NotificationWriter`] with bounded concurrency. Partial
//! failures are logged and reflected in the count; only a failed trigger
//! lookup or recipient page makes the dispatch unsuccessful.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use genera_core::event_config::{event_config_or_fallback, has_event_config};
use genera_core::idempotency::idempotency_key;
use genera_core::notification::DispatchStatus;
use genera_core::types::{DbId, EventData, Timestamp};
use genera_db::models::notification_trigger::NotificationTemplate;
use serde::{Deserialize, Serialize};

use crate::audit::AuditLogger;
use crate::bus::NotificationEvent;
use crate::config::DispatchConfig;
use crate::content::{resolve_content, ResolvedContent};
use crate::error::DispatchError;
use crate::recipients::RecipientResolver;
use crate::registry::discriminator;
use crate::store::NotificationStore;
use crate::writer::{DeliveryRequest, NotificationWriter};

// ---------------------------------------------------------------------------
// Options and outcomes
// ---------------------------------------------------------------------------

/// Per-invocation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Bypass the duplicate-content guard. Idempotency still applies.
    pub skip_duplicate_check: bool,
    /// Bypass quiet-hours deferral and digest batching.
    pub force_immediate: bool,
}

/// Result of one dispatch invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub success: bool,
    pub notifications_created: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    fn succeeded(notifications_created: usize) -> Self {
        Self {
            success: true,
            notifications_created,
            error: None,
        }
    }

    fn failed(error: String, notifications_created: usize) -> Self {
        Self {
            success: false,
            notifications_created,
            error: Some(error),
        }
    }
}

/// One entry of a batch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub event_type: String,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

/// A database trigger, or the one synthesized from the event config.
struct TriggerPlan {
    trigger_id: Option<DbId>,
    category: String,
    template: Option<NotificationTemplate>,
}

// ---------------------------------------------------------------------------
// NotificationDispatcher
// ---------------------------------------------------------------------------

pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    config: DispatchConfig,
    resolver: RecipientResolver,
    writer: NotificationWriter,
    audit: AuditLogger,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn NotificationStore>, config: DispatchConfig) -> Self {
        Self {
            resolver: RecipientResolver::new(store.clone(), config.broadcast_page_size),
            writer: NotificationWriter::new(store.clone(), &config),
            audit: AuditLogger::new(store.clone()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Dispatch an event now.
    pub async fn dispatch(
        &self,
        event_type: &str,
        data: &EventData,
        options: DispatchOptions,
    ) -> DispatchOutcome {
        self.dispatch_at(event_type, data, options, Utc::now()).await
    }

    /// Dispatch an event as if the current time were `now`.
    ///
    /// `now` drives quiet hours, digest scheduling, the duplicate window and
    /// the minute bucket of every idempotency key.
    pub async fn dispatch_at(
        &self,
        event_type: &str,
        data: &EventData,
        options: DispatchOptions,
        now: Timestamp,
    ) -> DispatchOutcome {
        let triggers = match self.store.active_triggers(event_type).await {
            Ok(triggers) => triggers,
            Err(e) => return self.abort(event_type, data, "Trigger lookup failed", e, 0).await,
        };

        let trigger_id = match triggers.as_slice() {
            [only] => Some(only.id),
            _ => None,
        };

        let plans: Vec<TriggerPlan> = if triggers.is_empty() {
            if !has_event_config(event_type) {
                tracing::warn!(
                    event_type = %event_type,
                    "No trigger or event config, using generic defaults",
                );
            }
            vec![TriggerPlan {
                trigger_id: None,
                category: event_config_or_fallback(event_type).category.to_string(),
                template: None,
            }]
        } else {
            triggers
                .iter()
                .map(|t| TriggerPlan {
                    trigger_id: Some(t.id),
                    category: t.category.clone(),
                    template: t.template(),
                })
                .collect()
        };

        let contents: Vec<ResolvedContent> = plans
            .iter()
            .map(|plan| resolve_content(plan.template.as_ref(), data, event_type))
            .collect();
        let discriminator = discriminator(event_type).extract(data);

        // Each batch of recipients is fetched once and goes through every
        // trigger before the next batch is read.
        let mut batches = self.resolver.batches(event_type, data);
        let mut recipients = 0;
        let mut created = 0;

        loop {
            let batch = match batches.next_batch().await {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(e) => {
                    return self
                        .abort(event_type, data, "Recipient resolution failed", e, created)
                        .await
                }
            };
            recipients += batch.len();

            for (plan, content) in plans.iter().zip(&contents) {
                created += self
                    .deliver(
                        event_type,
                        plan,
                        content,
                        &batch,
                        &discriminator,
                        options,
                        now,
                    )
                    .await;
            }
        }

        tracing::info!(
            event_type = %event_type,
            triggers = plans.len(),
            recipients,
            created,
            "Dispatch complete",
        );

        self.audit
            .record(
                event_type,
                data,
                trigger_id,
                created,
                DispatchStatus::Success,
                None,
            )
            .await;

        DispatchOutcome::succeeded(created)
    }

    /// Dispatch events one after another. A failing event never stops the
    /// rest of the batch.
    pub async fn dispatch_batch(&self, events: &[NotificationEvent]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            let outcome = self
                .dispatch(&event.event_type, &event.data, event.options)
                .await;
            outcomes.push(BatchOutcome {
                event_type: event.event_type.clone(),
                outcome,
            });
        }
        outcomes
    }

    /// Write one trigger's content to every recipient. Returns rows created.
    #[allow(clippy::too_many_arguments)]
    async fn deliver(
        &self,
        event_type: &str,
        plan: &TriggerPlan,
        content: &ResolvedContent,
        recipients: &[DbId],
        discriminator: &str,
        options: DispatchOptions,
        now: Timestamp,
    ) -> usize {
        let results: Vec<_> = stream::iter(recipients.iter().copied())
            .map(|user_id| {
                let request = DeliveryRequest {
                    user_id,
                    event_type,
                    category: &plan.category,
                    content,
                    idempotency_key: idempotency_key(event_type, discriminator, user_id, now),
                    options,
                    now,
                };
                async move { (user_id, self.writer.write(request).await) }
            })
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut created = 0;
        for (user_id, result) in results {
            match result {
                Ok(outcome) if outcome.is_created() => created += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        user_id,
                        event_type = %event_type,
                        trigger_id = ?plan.trigger_id,
                        "Failed to deliver notification",
                    );
                }
            }
        }
        created
    }

    async fn abort(
        &self,
        event_type: &str,
        data: &EventData,
        context: &str,
        error: DispatchError,
        created: usize,
    ) -> DispatchOutcome {
        let message = format!("{context}: {error}");
        tracing::error!(event_type = %event_type, error = %error, "{context}");
        self.audit
            .record(
                event_type,
                data,
                None,
                created,
                DispatchStatus::Failed,
                Some(message.clone()),
            )
            .await;
        DispatchOutcome::failed(message, created)
    }
}
