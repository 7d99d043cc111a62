//! Domain logic for the Genera notification engine.
//!
//! Everything in this crate is pure (no I/O, no async) so it can be shared by
//! the repository layer, the dispatch engine, and the HTTP surface.

pub mod digest;
pub mod error;
pub mod event_config;
pub mod hashing;
pub mod idempotency;
pub mod notification;
pub mod preferences;
pub mod template;
pub mod types;
