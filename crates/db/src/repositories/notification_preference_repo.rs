//! Repository for the `user_notification_preferences` table.

use genera_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification_preference::{UpsertPreferences, UserNotificationPreferences};

/// Column list for `user_notification_preferences` queries.
const COLUMNS: &str = "user_id, do_not_disturb, quiet_hours_start, quiet_hours_end, \
    weekend_quiet, priority_override, max_per_hour, notification_settings, \
    created_at, updated_at";

/// Preferences are read-only to the engine; `upsert` exists for seeding.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Load a user's preferences row, if one exists.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserNotificationPreferences>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM user_notification_preferences WHERE user_id = $1");
        sqlx::query_as::<_, UserNotificationPreferences>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace a user's preferences.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertPreferences,
    ) -> Result<UserNotificationPreferences, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_notification_preferences \
                (user_id, do_not_disturb, quiet_hours_start, quiet_hours_end, \
                 weekend_quiet, priority_override, max_per_hour, notification_settings) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (user_id) DO UPDATE SET \
                do_not_disturb = EXCLUDED.do_not_disturb, \
                quiet_hours_start = EXCLUDED.quiet_hours_start, \
                quiet_hours_end = EXCLUDED.quiet_hours_end, \
                weekend_quiet = EXCLUDED.weekend_quiet, \
                priority_override = EXCLUDED.priority_override, \
                max_per_hour = EXCLUDED.max_per_hour, \
                notification_settings = EXCLUDED.notification_settings, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserNotificationPreferences>(&query)
            .bind(input.user_id)
            .bind(input.do_not_disturb)
            .bind(input.quiet_hours_start)
            .bind(input.quiet_hours_end)
            .bind(input.weekend_quiet)
            .bind(input.priority_override)
            .bind(input.max_per_hour)
            .bind(&input.notification_settings)
            .fetch_one(pool)
            .await
    }
}
