//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the fire-and-forget entry point for domain events. Code
//! that detects a business event publishes a [`NotificationEvent`] and moves
//! on; the [`NotificationListener`](crate::listener::NotificationListener)
//! picks it up and runs the dispatch. Share it via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use genera_core::types::EventData;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::dispatcher::DispatchOptions;

// ---------------------------------------------------------------------------
// NotificationEvent
// ---------------------------------------------------------------------------

/// A domain event that may produce notifications.
///
/// Constructed via [`NotificationEvent::new`] and enriched with
/// [`with_data`](NotificationEvent::with_data) and
/// [`with_options`](NotificationEvent::with_options).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Snake-case event name, e.g. `"assignment_created"`.
    pub event_type: String,

    /// Free-form payload used for recipient resolution and substitution.
    pub data: EventData,

    #[serde(default)]
    pub options: DispatchOptions,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    /// Create an event with an empty payload and default options.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: EventData::new(),
            options: DispatchOptions::default(),
            timestamp: Utc::now(),
        }
    }

    /// Set the payload.
    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    /// Set the dispatch options.
    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use genera_events::bus::{EventBus, NotificationEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(NotificationEvent::new("system_update"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<NotificationEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it. With no
    /// subscribers the event is dropped and `0` is returned.
    pub fn publish(&self, event: NotificationEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
