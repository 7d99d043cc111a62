//! Recipient resolution.

use std::collections::HashSet;
use std::sync::Arc;

use genera_core::template::lookup_path;
use genera_core::types::{DbId, EventData};
use serde_json::Value;

use crate::error::DispatchResult;
use crate::registry::{route, RecipientRule};
use crate::store::NotificationStore;

/// Turns an event into the users to notify.
pub struct RecipientResolver {
    store: Arc<dyn NotificationStore>,
    page_size: usize,
}

impl RecipientResolver {
    pub fn new(store: Arc<dyn NotificationStore>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    /// Start resolving recipients for an event.
    ///
    /// Payload-addressed events yield one batch, de-duplicated in first-seen
    /// order. Broadcasts yield one batch per page of active users, fetched
    /// as the caller asks for it. Unknown event types yield nothing.
    pub fn batches<'a>(&'a self, event_type: &str, data: &EventData) -> RecipientBatches<'a> {
        let source = match route(event_type) {
            None => {
                tracing::warn!(event_type = %event_type, "No recipient route for event type");
                Source::Listed(None)
            }
            Some(route) => match route.recipients {
                RecipientRule::Broadcast => Source::Broadcast {
                    cursor: None,
                    done: false,
                },
                rule => Source::Listed(Some(dedup_preserving_order(ids_from_payload(rule, data)))),
            },
        };
        RecipientBatches {
            resolver: self,
            source,
            pages: 0,
            recipients: 0,
        }
    }
}

enum Source {
    Listed(Option<Vec<DbId>>),
    Broadcast { cursor: Option<DbId>, done: bool },
}

/// Recipients of one event, one batch at a time.
pub struct RecipientBatches<'a> {
    resolver: &'a RecipientResolver,
    source: Source,
    pages: usize,
    recipients: usize,
}

impl RecipientBatches<'_> {
    /// The next batch, or `None` when exhausted. Only broadcast pages touch
    /// the store, so only they can fail.
    pub async fn next_batch(&mut self) -> DispatchResult<Option<Vec<DbId>>> {
        match &mut self.source {
            Source::Listed(ids) => Ok(ids.take().filter(|ids| !ids.is_empty())),
            Source::Broadcast { done: true, .. } => Ok(None),
            Source::Broadcast { cursor, done } => {
                let page_size = self.resolver.page_size;
                let page = self
                    .resolver
                    .store
                    .active_user_page(*cursor, page_size)
                    .await?;
                self.pages += 1;
                self.recipients += page.len();
                *done = page.len() < page_size;
                *cursor = page.last().copied().or(*cursor);

                if *done {
                    tracing::debug!(
                        recipients = self.recipients,
                        pages = self.pages,
                        "Resolved broadcast recipients",
                    );
                }
                Ok(Some(page).filter(|p| !p.is_empty()))
            }
        }
    }
}

fn ids_from_payload(rule: RecipientRule, data: &EventData) -> Vec<DbId> {
    let at = |path: &str| lookup_path(data, path).map(user_ids).unwrap_or_default();

    match rule {
        RecipientRule::List(path) | RecipientRule::Single(path) => at(path),
        RecipientRule::ListOrSingle(list, single) => {
            let ids = at(list);
            if ids.is_empty() {
                at(single)
            } else {
                ids
            }
        }
        RecipientRule::Union(paths) => paths.iter().flat_map(|p| at(*p)).collect(),
        RecipientRule::Broadcast => Vec::new(),
    }
}

/// Extract user IDs from a JSON value: a number, a numeric string, or an
/// array of either. Anything else is skipped.
pub fn user_ids(value: &Value) -> Vec<DbId> {
    match value {
        Value::Array(items) => items.iter().filter_map(user_id).collect(),
        other => user_id(other).into_iter().collect(),
    }
}

fn user_id(value: &Value) -> Option<DbId> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if id.is_none() {
        tracing::debug!(value = %value, "Skipping unusable recipient id");
    }
    id
}

fn dedup_preserving_order(ids: Vec<DbId>) -> Vec<DbId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
