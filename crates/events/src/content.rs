//! Notification content resolution.
//!
//! Two stages: a database template when it substitutes cleanly, otherwise
//! the compiled-in [`EventConfig`](genera_core::event_config::EventConfig)
//! defaults. A title that still contains a `{...}` token after substitution
//! discards the whole template so users never see a half-rendered message.

use genera_core::event_config::event_config_or_fallback;
use genera_core::notification::Importance;
use genera_core::template::{has_unresolved_placeholders, placeholders, substitute};
use genera_core::types::EventData;
use genera_db::models::notification_trigger::NotificationTemplate;

/// Rendered title, description, URL and importance for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub title: String,
    pub description: String,
    pub url: String,
    pub importance: Importance,
}

/// Resolve content for an event, preferring `template` when usable.
pub fn resolve_content(
    template: Option<&NotificationTemplate>,
    data: &EventData,
    event_type: &str,
) -> ResolvedContent {
    let config = event_config_or_fallback(event_type);

    if let Some(template) = template {
        let title = substitute(&template.title_template, data);
        if !title.trim().is_empty() && !has_unresolved_placeholders(&title) {
            return ResolvedContent {
                title,
                description: rendered(template.description_template.as_deref(), data)
                    .unwrap_or_else(|| config.default_description(data)),
                url: rendered(template.url_template.as_deref(), data)
                    .unwrap_or_else(|| config.default_url.to_string()),
                importance: template.importance.unwrap_or(config.importance),
            };
        }
        tracing::debug!(
            event_type = %event_type,
            title = %title,
            missing = ?placeholders(&title),
            "Template left unresolved placeholders, using defaults",
        );
    }

    ResolvedContent {
        title: config.default_title(data),
        description: config.default_description(data),
        url: config.default_url.to_string(),
        importance: config.importance,
    }
}

/// Substitute an optional template field. Blank or partially resolved
/// output yields `None` so the caller falls back for that field alone.
fn rendered(text: Option<&str>, data: &EventData) -> Option<String> {
    let text = text.filter(|t| !t.trim().is_empty())?;
    let out = substitute(text, data);
    (!out.trim().is_empty() && !has_unresolved_placeholders(&out)).then_some(out)
}

#[cfg(test)]
mod tests {
    use genera_core::event_config::event_config;
    use serde_json::json;

    use super::*;

    fn data(value: serde_json::Value) -> EventData {
        value.as_object().cloned().unwrap_or_default()
    }

    fn template(title: &str, description: Option<&str>, url: Option<&str>) -> NotificationTemplate {
        NotificationTemplate {
            title_template: title.to_string(),
            description_template: description.map(str::to_string),
            url_template: url.map(str::to_string),
            importance: None,
        }
    }

    #[test]
    fn resolved_template_is_used() {
        let d = data(json!({"assignment": {"title": "Ensayo", "id": 4}, "course": "Historia"}));
        let t = template(
            "Nueva tarea: {assignment.title}",
            Some("Curso {course}"),
            Some("/assignments/{assignment.id}"),
        );
        let c = resolve_content(Some(&t), &d, "assignment_created");
        assert_eq!(c.title, "Nueva tarea: Ensayo");
        assert_eq!(c.description, "Curso Historia");
        assert_eq!(c.url, "/assignments/4");
        assert!(!c.title.contains('{'));
    }

    #[test]
    fn unresolved_title_falls_back_entirely() {
        let d = data(json!({"assignment": {"title": "Ensayo"}}));
        let t = template("Tarea {missing}", Some("Curso {course}"), Some("/x"));
        let c = resolve_content(Some(&t), &d, "assignment_created");

        let config = event_config("assignment_created").unwrap();
        assert_eq!(c.title, config.default_title(&d));
        assert_eq!(c.description, config.default_description(&d));
        assert_eq!(c.url, config.default_url);
        assert_eq!(c.importance, config.importance);
    }

    #[test]
    fn blank_fields_fall_back_one_by_one() {
        let d = data(json!({"sender": {"name": "Ana"}}));
        let t = template("Mensaje de {sender.name}", Some("  "), None);
        let c = resolve_content(Some(&t), &d, "message_sent");
        assert_eq!(c.title, "Mensaje de Ana");
        assert_eq!(c.description, "Has recibido un nuevo mensaje.");
        assert_eq!(c.url, "/messages");
    }

    #[test]
    fn template_importance_wins_over_config() {
        let mut t = template("Hola", None, None);
        t.importance = Some(Importance::High);
        let c = resolve_content(Some(&t), &EventData::new(), "system_update");
        assert_eq!(c.importance, Importance::High);

        t.importance = None;
        let c = resolve_content(Some(&t), &EventData::new(), "system_update");
        assert_eq!(c.importance, Importance::Low);
    }

    #[test]
    fn no_template_uses_config() {
        let d = data(json!({"course": {"name": "Álgebra"}}));
        let c = resolve_content(None, &d, "course_assigned");
        assert_eq!(c.title, "Nuevo curso asignado: Álgebra");
        assert_eq!(c.url, "/mi-aprendizaje");
    }

    #[test]
    fn unknown_event_uses_generic_fallback() {
        let c = resolve_content(None, &EventData::new(), "mystery");
        assert_eq!(c.title, "Nueva notificación");
        assert_eq!(c.description, "Tienes una nueva notificación en la plataforma.");
        assert_eq!(c.url, "/dashboard");
        assert_eq!(c.importance, Importance::Normal);
    }
}
