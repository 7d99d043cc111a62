pub mod delayed_notification;
pub mod digest_queue;
pub mod notification;
pub mod notification_event;
pub mod notification_preference;
pub mod notification_trigger;
pub mod user;
