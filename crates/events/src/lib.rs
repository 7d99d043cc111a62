//! Genera notification dispatch engine.
//!
//! This crate turns domain events into per-user notifications:
//!
//! - [`NotificationDispatcher`]: the `dispatch` entry point, sequencing
//!   recipient resolution, content rendering, preferences, deduplication,
//!   idempotent writes, digest queueing and the audit trail.
//! - [`EventBus`] and [`NotificationListener`]: fire-and-forget publishing
//!   over `tokio::sync::broadcast`.
//! - [`DelayedReleaser`]: background release of notifications deferred by
//!   quiet hours.
//! - [`NotificationStore`]: the persistence seam, with PostgreSQL and
//!   in-memory implementations.

pub mod audit;
pub mod bus;
pub mod config;
pub mod content;
pub mod dedup;
pub mod delayed;
pub mod digest;
pub mod dispatcher;
pub mod error;
pub mod listener;
pub mod rate_limit;
pub mod recipients;
pub mod registry;
pub mod store;
pub mod writer;

pub use bus::{EventBus, NotificationEvent};
pub use config::{ConfigError, DispatchConfig};
pub use delayed::DelayedReleaser;
pub use dispatcher::{BatchOutcome, DispatchOptions, DispatchOutcome, NotificationDispatcher};
pub use error::{DispatchError, DispatchResult};
pub use listener::NotificationListener;
pub use store::{InMemoryNotificationStore, NotificationStore, PgNotificationStore};
