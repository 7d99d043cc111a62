//! Notification trigger and template models.

use genera_core::notification::Importance;
use genera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notification_triggers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationTrigger {
    pub id: DbId,
    pub event_type: String,
    pub category: String,
    pub notification_template: serde_json::Value,
    pub trigger_condition: Option<serde_json::Value>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NotificationTrigger {
    /// Parse the JSON template. A malformed or title-less template yields
    /// `None`, which the content resolver treats as "no template".
    pub fn template(&self) -> Option<NotificationTemplate> {
        match serde_json::from_value::<NotificationTemplate>(self.notification_template.clone()) {
            Ok(t) if !t.title_template.trim().is_empty() => Some(t),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    trigger_id = self.id,
                    event_type = %self.event_type,
                    error = %e,
                    "Ignoring malformed notification template",
                );
                None
            }
        }
    }
}

/// The JSON shape stored in `notification_triggers.notification_template`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    #[serde(default)]
    pub title_template: String,
    #[serde(default)]
    pub description_template: Option<String>,
    #[serde(default)]
    pub url_template: Option<String>,
    #[serde(default)]
    pub importance: Option<Importance>,
}

/// DTO for creating a trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationTrigger {
    pub event_type: String,
    pub category: String,
    pub notification_template: serde_json::Value,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn trigger(template: serde_json::Value) -> NotificationTrigger {
        NotificationTrigger {
            id: 1,
            event_type: "assignment_created".into(),
            category: "assignments".into(),
            notification_template: template,
            trigger_condition: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_full_template() {
        let t = trigger(json!({
            "title_template": "Nueva tarea: {assignment_name}",
            "description_template": "Entrega el {due_date}",
            "url_template": "/assignments/{assignment_id}",
            "importance": "high",
        }))
        .template()
        .unwrap();
        assert_eq!(t.title_template, "Nueva tarea: {assignment_name}");
        assert_eq!(t.importance, Some(Importance::High));
    }

    #[test]
    fn missing_title_means_no_template() {
        assert!(trigger(json!({"description_template": "x"})).template().is_none());
        assert!(trigger(json!({})).template().is_none());
    }

    #[test]
    fn malformed_template_is_ignored() {
        assert!(trigger(json!({"title_template": 12})).template().is_none());
        assert!(trigger(json!("plain string")).template().is_none());
    }
}
