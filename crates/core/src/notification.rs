//! Notification vocabulary shared by every layer.
//!
//! The string forms returned by `as_str` must match the values stored in the
//! `user_notifications.importance`, `notification_digest_queue.digest_type`
//! and `user_notification_preferences.notification_settings` columns.

use serde::{Deserialize, Serialize};

/// Category used when neither a trigger nor an event config supplies one.
pub const CATEGORY_SYSTEM: &str = "system";

/// Reason recorded on a deferred notification held back by quiet hours.
pub const DELAY_REASON_QUIET_HOURS: &str = "quiet_hours";

// ---------------------------------------------------------------------------
// Importance
// ---------------------------------------------------------------------------

/// Display priority of a notification. `High` may override quiet hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    #[serde(alias = "medium")]
    Normal,
    High,
}

impl Importance {
    pub fn as_str(self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Normal => "normal",
            Importance::High => "high",
        }
    }

    /// Parse a stored importance value. Unknown values map to `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Importance::Low),
            "normal" | "medium" => Some(Importance::Normal),
            "high" => Some(Importance::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EmailFrequency
// ---------------------------------------------------------------------------

/// How often a user wants email for a given event type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailFrequency {
    #[default]
    Immediate,
    Daily,
    Weekly,
    Never,
}

impl EmailFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            EmailFrequency::Immediate => "immediate",
            EmailFrequency::Daily => "daily",
            EmailFrequency::Weekly => "weekly",
            EmailFrequency::Never => "never",
        }
    }

    /// The digest cadence this frequency batches into, if any.
    pub fn digest_type(self) -> Option<DigestType> {
        match self {
            EmailFrequency::Daily => Some(DigestType::Daily),
            EmailFrequency::Weekly => Some(DigestType::Weekly),
            EmailFrequency::Immediate | EmailFrequency::Never => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DigestType
// ---------------------------------------------------------------------------

/// Cadence of a queued email digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestType {
    Daily,
    Weekly,
}

impl DigestType {
    pub fn as_str(self) -> &'static str {
        match self {
            DigestType::Daily => "daily",
            DigestType::Weekly => "weekly",
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch status
// ---------------------------------------------------------------------------

/// Outcome recorded in the `notification_events` audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Success,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchStatus::Success => "success",
            DispatchStatus::Failed => "failed",
        }
    }
}
