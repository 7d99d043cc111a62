//! Repository layer: one zero-sized struct per table, each method taking a
//! `&PgPool`.

pub mod delayed_notification_repo;
pub mod digest_queue_repo;
pub mod notification_event_repo;
pub mod notification_preference_repo;
pub mod notification_repo;
pub mod notification_trigger_repo;
pub mod user_repo;

pub use delayed_notification_repo::DelayedNotificationRepo;
pub use digest_queue_repo::DigestQueueRepo;
pub use notification_event_repo::NotificationEventRepo;
pub use notification_preference_repo::NotificationPreferenceRepo;
pub use notification_repo::NotificationRepo;
pub use notification_trigger_repo::NotificationTriggerRepo;
pub use user_repo::UserRepo;
