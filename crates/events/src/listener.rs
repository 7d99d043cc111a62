//! Bus-driven dispatch.
//!
//! [`NotificationListener`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and dispatches every received [`NotificationEvent`](crate::bus::NotificationEvent).
//! It runs as a long-lived background task and shuts down when the bus
//! sender is dropped.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::NotificationEvent;
use crate::dispatcher::NotificationDispatcher;

pub struct NotificationListener {
    dispatcher: Arc<NotificationDispatcher>,
}

impl NotificationListener {
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Run the listener loop.
    ///
    /// Events are dispatched in arrival order. The loop exits when the
    /// channel is closed.
    pub async fn run(&self, mut receiver: broadcast::Receiver<NotificationEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let outcome = self
                        .dispatcher
                        .dispatch(&event.event_type, &event.data, event.options)
                        .await;
                    if !outcome.success {
                        tracing::warn!(
                            event_type = %event.event_type,
                            error = ?outcome.error,
                            "Bus event dispatch failed"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification listener lagged, some events were not dispatched"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification listener shutting down");
                    break;
                }
            }
        }
    }
}
