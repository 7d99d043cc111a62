//! Per-user notification preference models.

use std::collections::HashMap;

use chrono::NaiveTime;
use genera_core::preferences::{CategorySetting, UserPreferences};
use genera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_notification_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserNotificationPreferences {
    pub user_id: DbId,
    pub do_not_disturb: bool,
    pub quiet_hours_start: NaiveTime,
    pub quiet_hours_end: NaiveTime,
    pub weekend_quiet: bool,
    pub priority_override: bool,
    pub max_per_hour: i32,
    pub notification_settings: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserNotificationPreferences {
    /// Convert the stored row into the domain type.
    ///
    /// Entries of `notification_settings` that do not parse are dropped, which
    /// leaves those event types on the send-everything default.
    pub fn into_preferences(self) -> UserPreferences {
        UserPreferences {
            do_not_disturb: self.do_not_disturb,
            quiet_hours_start: self.quiet_hours_start,
            quiet_hours_end: self.quiet_hours_end,
            weekend_quiet: self.weekend_quiet,
            priority_override: self.priority_override,
            max_per_hour: u32::try_from(self.max_per_hour).unwrap_or(0),
            notification_settings: parse_settings(self.user_id, self.notification_settings),
        }
    }
}

fn parse_settings(user_id: DbId, value: serde_json::Value) -> HashMap<String, CategorySetting> {
    let serde_json::Value::Object(entries) = value else {
        return HashMap::new();
    };

    entries
        .into_iter()
        .filter_map(|(event_type, raw)| {
            match serde_json::from_value::<CategorySetting>(raw) {
                Ok(setting) => Some((event_type, setting)),
                Err(e) => {
                    tracing::warn!(
                        user_id,
                        event_type = %event_type,
                        error = %e,
                        "Skipping unreadable notification setting",
                    );
                    None
                }
            }
        })
        .collect()
}

/// DTO for inserting or replacing a user's preferences.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPreferences {
    pub user_id: DbId,
    pub do_not_disturb: bool,
    pub quiet_hours_start: NaiveTime,
    pub quiet_hours_end: NaiveTime,
    pub weekend_quiet: bool,
    pub priority_override: bool,
    pub max_per_hour: i32,
    pub notification_settings: serde_json::Value,
}

impl UpsertPreferences {
    /// Defaults matching the column defaults, for the given user.
    pub fn defaults_for(user_id: DbId) -> Self {
        let d = UserPreferences::default();
        Self {
            user_id,
            do_not_disturb: d.do_not_disturb,
            quiet_hours_start: d.quiet_hours_start,
            quiet_hours_end: d.quiet_hours_end,
            weekend_quiet: d.weekend_quiet,
            priority_override: d.priority_override,
            max_per_hour: i32::try_from(d.max_per_hour).unwrap_or(i32::MAX),
            notification_settings: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use genera_core::notification::EmailFrequency;
    use serde_json::json;

    use super::*;

    fn row(settings: serde_json::Value) -> UserNotificationPreferences {
        UserNotificationPreferences {
            user_id: 4,
            do_not_disturb: false,
            quiet_hours_start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            quiet_hours_end: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            weekend_quiet: true,
            priority_override: true,
            max_per_hour: 3,
            notification_settings: settings,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn converts_row_with_settings() {
        let prefs = row(json!({
            "assignment_created": {"in_app_enabled": true, "email_enabled": true, "frequency": "daily"},
        }))
        .into_preferences();
        assert_eq!(prefs.max_per_hour, 3);
        assert!(prefs.weekend_quiet);
        assert_eq!(
            prefs.notification_settings["assignment_created"].frequency,
            EmailFrequency::Daily
        );
    }

    #[test]
    fn unreadable_entries_are_dropped() {
        let prefs = row(json!({
            "message_sent": {"frequency": "hourly"},
            "course_assigned": {"email_enabled": false},
        }))
        .into_preferences();
        assert!(!prefs.notification_settings.contains_key("message_sent"));
        assert!(prefs.notification_settings.contains_key("course_assigned"));
    }

    #[test]
    fn non_object_settings_become_empty() {
        let prefs = row(json!([1, 2])).into_preferences();
        assert!(prefs.notification_settings.is_empty());
    }

    #[test]
    fn negative_ceiling_clamps_to_zero() {
        let mut r = row(json!({}));
        r.max_per_hour = -1;
        assert_eq!(r.into_preferences().max_per_hour, 0);
    }
}
