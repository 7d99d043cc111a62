//! Handlers for the `/notifications` resource.
//!
//! Callers are trusted backend services; there is no per-user auth here.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use genera_core::event_config::{event_config, registered_event_types};
use genera_core::notification::Importance;
use genera_core::types::EventData;
use genera_db::models::notification_event::NotificationEventLog;
use genera_db::models::notification_trigger::NotificationTrigger;
use genera_db::repositories::{NotificationEventRepo, NotificationTriggerRepo};
use genera_events::{BatchOutcome, DispatchOptions, DispatchOutcome, NotificationEvent};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum events accepted by one batch request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Maximum page size for audit listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for audit listing.
const DEFAULT_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /notifications/dispatch` and `POST /notifications/publish`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DispatchRequest {
    #[validate(length(min = 1, max = 100, message = "event_type must be 1-100 characters"))]
    pub event_type: String,
    #[serde(default)]
    pub event_data: EventData,
    #[serde(default)]
    pub options: DispatchOptions,
}

impl DispatchRequest {
    fn into_event(self) -> NotificationEvent {
        NotificationEvent::new(self.event_type)
            .with_data(self.event_data)
            .with_options(self.options)
    }
}

/// Body of `POST /notifications/batch`.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchRequest {
    #[validate(length(max = 100, message = "a batch holds at most 100 events"))]
    pub events: Vec<DispatchRequest>,
}

#[derive(Debug, Serialize)]
pub struct PublishReceipt {
    pub event_type: String,
    pub subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct EventTypeInfo {
    pub event_type: &'static str,
    pub category: &'static str,
    pub importance: Importance,
    pub default_url: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct EventTypeQuery {
    pub event_type: String,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/dispatch
///
/// Run a dispatch and wait for it. A dispatch that could not be attempted
/// still answers 200 with `success: false` in the outcome.
pub async fn dispatch(
    State(state): State<AppState>,
    Json(input): Json<DispatchRequest>,
) -> AppResult<Json<DataResponse<DispatchOutcome>>> {
    input.validate()?;

    let outcome = state
        .dispatcher
        .dispatch(&input.event_type, &input.event_data, input.options)
        .await;

    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/notifications/publish
///
/// Hand the event to the bus and return immediately with 202 Accepted.
pub async fn publish(
    State(state): State<AppState>,
    Json(input): Json<DispatchRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PublishReceipt>>)> {
    input.validate()?;

    let event = input.into_event();
    let event_type = event.event_type.clone();
    let subscribers = state.event_bus.publish(event);
    if subscribers == 0 {
        tracing::warn!(event_type = %event_type, "Published event has no listener");
        return Err(AppError::Unavailable(
            "No notification listener is running".to_string(),
        ));
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: PublishReceipt {
                event_type,
                subscribers,
            },
        }),
    ))
}

/// POST /api/v1/notifications/batch
///
/// Dispatch up to [`MAX_BATCH_SIZE`] events in order.
pub async fn batch(
    State(state): State<AppState>,
    Json(input): Json<BatchRequest>,
) -> AppResult<Json<DataResponse<Vec<BatchOutcome>>>> {
    input.validate()?;
    for event in &input.events {
        event.validate()?;
    }

    let events: Vec<NotificationEvent> = input
        .events
        .into_iter()
        .map(DispatchRequest::into_event)
        .collect();
    let outcomes = state.dispatcher.dispatch_batch(&events).await;

    Ok(Json(DataResponse { data: outcomes }))
}

// ---------------------------------------------------------------------------
// Introspection
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications/event-types
///
/// Every event type with compiled-in defaults.
pub async fn list_event_types() -> Json<DataResponse<Vec<EventTypeInfo>>> {
    let types = registered_event_types()
        .into_iter()
        .filter_map(event_config)
        .map(|config| EventTypeInfo {
            event_type: config.event_type,
            category: config.category,
            importance: config.importance,
            default_url: config.default_url,
        })
        .collect();

    Json(DataResponse { data: types })
}

/// GET /api/v1/notifications/triggers?event_type=...
///
/// Active database triggers for one event type.
pub async fn list_triggers(
    State(state): State<AppState>,
    Query(params): Query<EventTypeQuery>,
) -> AppResult<Json<DataResponse<Vec<NotificationTrigger>>>> {
    let pool = database(&state)?;
    let triggers = NotificationTriggerRepo::list_active_for_event(pool, &params.event_type).await?;

    Ok(Json(DataResponse { data: triggers }))
}

/// GET /api/v1/notifications/events?event_type=...&limit=...
///
/// Most recent audit records for one event type.
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventTypeQuery>,
) -> AppResult<Json<DataResponse<Vec<NotificationEventLog>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let pool = database(&state)?;
    let events =
        NotificationEventRepo::list_recent_for_event(pool, &params.event_type, limit).await?;

    Ok(Json(DataResponse { data: events }))
}

fn database(state: &AppState) -> AppResult<&genera_db::DbPool> {
    state
        .pool
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Database is not configured".to_string()))
}
