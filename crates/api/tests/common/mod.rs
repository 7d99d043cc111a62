use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use genera_api::config::ServerConfig;
use genera_api::router::build_app_router;
use genera_api::state::AppState;
use genera_events::{DispatchConfig, EventBus, InMemoryNotificationStore, NotificationDispatcher};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
    }
}

/// Everything a test needs to drive and inspect the app.
pub struct TestApp {
    pub store: Arc<InMemoryNotificationStore>,
    pub event_bus: Arc<EventBus>,
    pub dispatcher: Arc<NotificationDispatcher>,
    state: AppState,
}

impl TestApp {
    /// A fresh router over the same state. `oneshot` consumes the router,
    /// so call this once per request.
    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &test_config())
    }
}

/// Build the application over an in-memory store and no database.
pub fn build_test_app() -> TestApp {
    let store = Arc::new(InMemoryNotificationStore::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        store.clone(),
        DispatchConfig::default(),
    ));
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool: None,
        config: Arc::new(test_config()),
        dispatcher: Arc::clone(&dispatcher),
        event_bus: Arc::clone(&event_bus),
    };

    TestApp {
        store,
        event_bus,
        dispatcher,
        state,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
