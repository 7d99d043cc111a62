//! Error type for the dispatch engine.

/// Failure inside the dispatch engine.
///
/// None of these escape [`NotificationDispatcher::dispatch`](crate::NotificationDispatcher::dispatch):
/// they are logged, counted, or folded into the returned outcome.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A non-database store failure (e.g. an injected test failure).
    #[error("Store error: {0}")]
    Store(String),

    #[error("Recipient resolution failed: {0}")]
    Resolution(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
