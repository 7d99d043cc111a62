use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genera_api::config::ServerConfig;
use genera_api::router::build_app_router;
use genera_api::state::AppState;
use genera_events::{
    DelayedReleaser, DispatchConfig, EventBus, NotificationDispatcher, NotificationListener,
    NotificationStore, PgNotificationStore,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "genera_api=debug,genera_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    let dispatch_config = DispatchConfig::from_env().expect("Invalid dispatch configuration");
    tracing::info!(
        host = %config.host,
        port = %config.port,
        utc_offset = %dispatch_config.utc_offset,
        "Loaded configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = genera_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    genera_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    genera_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Dispatch engine ---
    let store: Arc<dyn NotificationStore> = Arc::new(PgNotificationStore::new(pool.clone()));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::clone(&store),
        dispatch_config.clone(),
    ));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn the bus listener (dispatches fire-and-forget events).
    let listener = NotificationListener::new(Arc::clone(&dispatcher));
    let receiver = event_bus.subscribe();
    let listener_handle = tokio::spawn(async move { listener.run(receiver).await });

    // Spawn the delayed releaser (quiet-hours deferrals).
    let releaser_cancel = CancellationToken::new();
    let releaser = DelayedReleaser::new(store, dispatch_config.delayed_poll_interval);
    let releaser_cancel_clone = releaser_cancel.clone();
    let releaser_handle = tokio::spawn(async move {
        releaser.run(releaser_cancel_clone).await;
    });

    tracing::info!("Notification services started (listener, delayed releaser)");

    // --- App state ---
    let state = AppState {
        pool: Some(pool),
        config: Arc::new(config.clone()),
        dispatcher,
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    releaser_cancel.cancel();
    let _ = tokio::time::timeout(grace, releaser_handle).await;
    tracing::info!("Delayed releaser stopped");

    // Dropping the last bus handle closes the channel and stops the listener.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, listener_handle).await;
    tracing::info!("Notification listener stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
