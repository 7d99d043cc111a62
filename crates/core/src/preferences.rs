//! Per-recipient delivery decisions.
//!
//! [`decide`] applies a user's stored preferences to one notification:
//!
//! 1. Do-not-disturb suppresses every channel.
//! 2. Inside quiet hours the notification is deferred to the next quiet-hours
//!    end, unless it is `High` importance and the user allows priority
//!    override.
//! 3. Otherwise the per-event-type setting picks the channels and email
//!    frequency.
//!
//! A user without a preferences row gets in-app plus immediate email and is
//! never deferred: missing preferences must not silently suppress anything.
//! The hourly rate ceiling is stateful and enforced by the dispatch engine
//! using [`UserPreferences::max_per_hour`].

use std::collections::HashMap;

use chrono::{Datelike, Duration, FixedOffset, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::digest::local_to_utc;
use crate::notification::{EmailFrequency, Importance};
use crate::types::Timestamp;

/// Default hourly ceiling for users who have a preferences row without one.
pub const DEFAULT_MAX_PER_HOUR: u32 = 5;

/// Per-event-type delivery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySetting {
    pub in_app_enabled: bool,
    pub email_enabled: bool,
    pub frequency: EmailFrequency,
    pub priority: Importance,
}

impl Default for CategorySetting {
    fn default() -> Self {
        Self {
            in_app_enabled: true,
            email_enabled: true,
            frequency: EmailFrequency::Immediate,
            priority: Importance::Normal,
        }
    }
}

/// A user's notification preferences, as read from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPreferences {
    pub do_not_disturb: bool,
    pub quiet_hours_start: NaiveTime,
    pub quiet_hours_end: NaiveTime,
    pub weekend_quiet: bool,
    pub priority_override: bool,
    pub max_per_hour: u32,
    /// Keyed by event type.
    pub notification_settings: HashMap<String, CategorySetting>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            do_not_disturb: false,
            quiet_hours_start: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            quiet_hours_end: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            weekend_quiet: false,
            priority_override: true,
            max_per_hour: DEFAULT_MAX_PER_HOUR,
            notification_settings: HashMap::new(),
        }
    }
}

/// Parse an `HH:MM` (or `HH:MM:SS`) quiet-hours boundary.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// What to do with one notification for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryDecision {
    pub send_in_app: bool,
    pub send_email: bool,
    pub email_frequency: EmailFrequency,
    /// Set when quiet hours hold the notification back until this time.
    pub deferred_until: Option<Timestamp>,
}

impl DeliveryDecision {
    /// Both channels, right now.
    pub fn immediate() -> Self {
        Self {
            send_in_app: true,
            send_email: true,
            email_frequency: EmailFrequency::Immediate,
            deferred_until: None,
        }
    }

    /// Nothing at all.
    pub fn suppressed() -> Self {
        Self {
            send_in_app: false,
            send_email: false,
            email_frequency: EmailFrequency::Never,
            deferred_until: None,
        }
    }

    fn deferred(until: Timestamp) -> Self {
        Self {
            send_in_app: false,
            send_email: false,
            email_frequency: EmailFrequency::Never,
            deferred_until: Some(until),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        !self.send_in_app && !self.send_email && self.deferred_until.is_none()
    }
}

/// Decide delivery for one notification.
///
/// `offset` is the local offset quiet hours are expressed in.
pub fn decide(
    preferences: Option<&UserPreferences>,
    event_type: &str,
    importance: Importance,
    now: Timestamp,
    offset: FixedOffset,
) -> DeliveryDecision {
    let Some(prefs) = preferences else {
        return DeliveryDecision::immediate();
    };

    if prefs.do_not_disturb {
        return DeliveryDecision::suppressed();
    }

    if is_in_quiet_hours(prefs, now, offset) && !overrides_quiet_hours(prefs, importance) {
        return DeliveryDecision::deferred(next_quiet_hours_end(prefs, now, offset));
    }

    category_decision(prefs, event_type)
}

/// Channels and frequency from the per-event-type setting alone, ignoring
/// do-not-disturb and quiet hours.
pub fn category_decision(prefs: &UserPreferences, event_type: &str) -> DeliveryDecision {
    match prefs.notification_settings.get(event_type) {
        Some(setting) => {
            let send_email =
                setting.email_enabled && setting.frequency != EmailFrequency::Never;
            DeliveryDecision {
                send_in_app: setting.in_app_enabled,
                send_email,
                email_frequency: if send_email {
                    setting.frequency
                } else {
                    EmailFrequency::Never
                },
                deferred_until: None,
            }
        }
        None => DeliveryDecision::immediate(),
    }
}

/// High-importance notifications pass quiet hours when the user allows it.
pub fn overrides_quiet_hours(prefs: &UserPreferences, importance: Importance) -> bool {
    prefs.priority_override && importance == Importance::High
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Whether `now` falls inside the user's quiet window.
///
/// The window is `[start, end)` at minute precision and wraps midnight when
/// `start > end`. With `weekend_quiet`, Saturday and Sunday are quiet all day.
pub fn is_in_quiet_hours(prefs: &UserPreferences, now: Timestamp, offset: FixedOffset) -> bool {
    let local = now.with_timezone(&offset);
    if prefs.weekend_quiet && is_weekend(local.weekday()) {
        return true;
    }

    let current = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0).unwrap_or(NaiveTime::MIN);
    let (start, end) = (prefs.quiet_hours_start, prefs.quiet_hours_end);
    if start > end {
        current >= start || current < end
    } else {
        current >= start && current < end
    }
}

/// The first quiet-hours end strictly after `now`, skipping weekend days when
/// weekends are quiet.
pub fn next_quiet_hours_end(prefs: &UserPreferences, now: Timestamp, offset: FixedOffset) -> Timestamp {
    let local = now.with_timezone(&offset).naive_local();
    let mut day = local.date();
    if day.and_time(prefs.quiet_hours_end) <= local {
        day += Duration::days(1);
    }
    if prefs.weekend_quiet {
        while is_weekend(day.weekday()) {
            day += Duration::days(1);
        }
    }
    local_to_utc(day.and_time(prefs.quiet_hours_end), offset)
}
