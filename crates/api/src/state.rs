use std::sync::Arc;

use genera_events::{EventBus, NotificationDispatcher};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database pool. `None` when the engine runs on the in-memory store.
    pub pool: Option<genera_db::DbPool>,
    pub config: Arc<ServerConfig>,
    /// The dispatch engine, shared with the bus listener.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Fire-and-forget entry point for domain events.
    pub event_bus: Arc<EventBus>,
}
