pub mod health;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /notifications/dispatch                          dispatch and wait (POST)
/// /notifications/publish                           publish to the bus (POST)
/// /notifications/batch                             dispatch in order (POST)
/// /notifications/event-types                       compiled-in event types (GET)
/// /notifications/triggers                          active triggers (GET, ?event_type)
/// /notifications/events                            audit records (GET, ?event_type, limit)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/notifications", notification::router())
}
