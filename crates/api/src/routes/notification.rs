//! Route definitions for the `/notifications` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// POST   /dispatch                  -> dispatch
/// POST   /publish                   -> publish
/// POST   /batch                     -> batch
///
/// GET    /event-types               -> list_event_types
/// GET    /triggers                  -> list_triggers
/// GET    /events                    -> list_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dispatch", post(notification::dispatch))
        .route("/publish", post(notification::publish))
        .route("/batch", post(notification::batch))
        .route("/event-types", get(notification::list_event_types))
        .route("/triggers", get(notification::list_triggers))
        .route("/events", get(notification::list_events))
}
