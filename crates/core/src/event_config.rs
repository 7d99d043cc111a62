//! Compiled-in defaults for every known notification event type.
//!
//! Each [`EventConfig`] supplies the title, description, URL, importance and
//! category used when no database template exists for an event, or when the
//! template cannot be fully substituted. Unknown event types resolve to
//! [`FALLBACK_CONFIG`] so dispatch degrades instead of dropping the event.
//!
//! To add an event type, register it in [`build_registry`] and give the
//! dispatch engine a recipient route for it.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};

use crate::notification::{Importance, CATEGORY_SYSTEM};
use crate::template::{lookup_path, render_value};
use crate::types::EventData;

/// Generates a default title or description from the event payload.
pub type TextGenerator = fn(&EventData) -> String;

/// Code-defined defaults for one event type.
#[derive(Clone, Copy)]
pub struct EventConfig {
    pub event_type: &'static str,
    pub category: &'static str,
    pub importance: Importance,
    pub default_url: &'static str,
    title: TextGenerator,
    description: TextGenerator,
}

impl EventConfig {
    pub fn default_title(&self, data: &EventData) -> String {
        (self.title)(data)
    }

    pub fn default_description(&self, data: &EventData) -> String {
        (self.description)(data)
    }
}

impl std::fmt::Debug for EventConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventConfig")
            .field("event_type", &self.event_type)
            .field("category", &self.category)
            .field("importance", &self.importance)
            .field("default_url", &self.default_url)
            .finish_non_exhaustive()
    }
}

/// Generic defaults for event types with no registered config.
pub static FALLBACK_CONFIG: EventConfig = EventConfig {
    event_type: "",
    category: CATEGORY_SYSTEM,
    importance: Importance::Normal,
    default_url: "/dashboard",
    title: fallback_title,
    description: fallback_description,
};

fn fallback_title(_: &EventData) -> String {
    "Nueva notificación".to_string()
}

fn fallback_description(_: &EventData) -> String {
    "Tienes una nueva notificación en la plataforma.".to_string()
}

static REGISTRY: LazyLock<HashMap<&'static str, EventConfig>> = LazyLock::new(build_registry);

/// Look up the config for an event type.
pub fn event_config(event_type: &str) -> Option<&'static EventConfig> {
    REGISTRY.get(event_type)
}

/// Look up the config for an event type, falling back to [`FALLBACK_CONFIG`].
pub fn event_config_or_fallback(event_type: &str) -> &'static EventConfig {
    event_config(event_type).unwrap_or(&FALLBACK_CONFIG)
}

/// Whether an event type has a registered config.
pub fn has_event_config(event_type: &str) -> bool {
    REGISTRY.contains_key(event_type)
}

/// All registered event types, sorted.
pub fn registered_event_types() -> Vec<&'static str> {
    let mut types: Vec<_> = REGISTRY.keys().copied().collect();
    types.sort_unstable();
    types
}

// ---------------------------------------------------------------------------
// Payload helpers
// ---------------------------------------------------------------------------

/// Non-empty text at a dotted path.
fn text(d: &EventData, path: &str) -> Option<String> {
    lookup_path(d, path)
        .and_then(render_value)
        .filter(|s| !s.is_empty())
}

fn text_or(d: &EventData, path: &str, default: &str) -> String {
    text(d, path).unwrap_or_else(|| default.to_string())
}

/// A date at a dotted path formatted `dd-mm-YYYY`.
fn date(d: &EventData, path: &str) -> Option<String> {
    let raw = text(d, path)?;
    let parsed = DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(&raw), "%Y-%m-%d"))
        .ok()?;
    Some(parsed.format("%d-%m-%Y").to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn string_list(d: &EventData, path: &str) -> Option<Vec<String>> {
    let items = lookup_path(d, path)?.as_array()?;
    Some(items.iter().filter_map(render_value).collect())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn build_registry() -> HashMap<&'static str, EventConfig> {
    let configs = [
        // Courses
        EventConfig {
            event_type: "course_assigned",
            category: "courses",
            importance: Importance::Normal,
            default_url: "/mi-aprendizaje",
            title: |d| match text(d, "course.name") {
                Some(name) => format!("Nuevo curso asignado: {name}"),
                None => "Nuevo curso asignado".to_string(),
            },
            description: |d| match text(d, "course.name") {
                Some(name) => format!(
                    "Se te ha asignado el curso \"{name}\". Haz clic para comenzar tu aprendizaje."
                ),
                None => "Se te ha asignado un nuevo curso.".to_string(),
            },
        },
        EventConfig {
            event_type: "course_completed",
            category: "courses",
            importance: Importance::Normal,
            default_url: "/mi-aprendizaje",
            title: |d| match text(d, "course.name") {
                Some(name) => format!("¡Curso completado!: {name}"),
                None => "¡Curso completado!".to_string(),
            },
            description: |d| match text(d, "course.name") {
                Some(name) => {
                    format!("Has completado exitosamente el curso \"{name}\". ¡Felicitaciones!")
                }
                None => "Has completado un curso exitosamente.".to_string(),
            },
        },
        EventConfig {
            event_type: "module_completed",
            category: "courses",
            importance: Importance::Low,
            default_url: "/mi-aprendizaje",
            title: |d| match text(d, "module.name") {
                Some(name) => format!("Módulo completado: {name}"),
                None => "Módulo completado".to_string(),
            },
            description: |d| {
                let module = text_or(d, "module.name", "el módulo");
                let course = text(d, "course.name")
                    .map(|c| format!(" del curso \"{c}\""))
                    .unwrap_or_default();
                format!("Has completado {module}{course}.")
            },
        },
        EventConfig {
            event_type: "learning_path_assigned",
            category: "courses",
            importance: Importance::Normal,
            default_url: "/mi-aprendizaje",
            title: |d| match text(d, "learning_path.name") {
                Some(name) => format!("Nueva ruta asignada: {name}"),
                None => "Nueva ruta de aprendizaje asignada".to_string(),
            },
            description: |d| match text(d, "learning_path.name") {
                Some(name) => format!("Se te ha asignado la ruta de aprendizaje \"{name}\"."),
                None => "Se te ha asignado una nueva ruta de aprendizaje.".to_string(),
            },
        },
        // Assignments
        EventConfig {
            event_type: "assignment_created",
            category: "assignments",
            importance: Importance::Normal,
            default_url: "/assignments",
            title: |d| match text(d, "assignment.title") {
                Some(title) => format!("Nueva tarea: {title}"),
                None => "Nueva tarea asignada".to_string(),
            },
            description: |d| {
                let title = text_or(d, "assignment.title", "una nueva tarea");
                let due = date(d, "assignment.due_date")
                    .map(|due| format!(" Fecha límite: {due}."))
                    .unwrap_or_default();
                format!("Tienes asignada la tarea \"{title}\".{due}")
            },
        },
        EventConfig {
            event_type: "assignment_feedback",
            category: "assignments",
            importance: Importance::Normal,
            default_url: "/assignments",
            title: |d| match text(d, "assignment.title") {
                Some(title) => format!("Retroalimentación recibida: {title}"),
                None => "Has recibido retroalimentación".to_string(),
            },
            description: |d| match text(d, "assignment.title") {
                Some(title) => format!("Tu tarea \"{title}\" ha sido revisada."),
                None => "Una de tus tareas ha sido revisada.".to_string(),
            },
        },
        EventConfig {
            event_type: "assignment_due_soon",
            category: "assignments",
            importance: Importance::High,
            default_url: "/assignments",
            title: |d| match text(d, "assignment.title") {
                Some(title) => format!("Tarea próxima a vencer: {title}"),
                None => "Tarea próxima a vencer".to_string(),
            },
            description: |d| {
                let title = text_or(d, "assignment.title", "una tarea");
                let due = date(d, "assignment.due_date").unwrap_or_else(|| "pronto".to_string());
                format!("La tarea \"{title}\" vence el {due}. No olvides completarla.")
            },
        },
        // Messaging
        EventConfig {
            event_type: "message_sent",
            category: "messaging",
            importance: Importance::Normal,
            default_url: "/messages",
            title: |d| match text(d, "sender.name") {
                Some(name) => format!("Mensaje de {name}"),
                None => "Nuevo mensaje".to_string(),
            },
            description: |d| match text(d, "message_preview") {
                Some(preview) => truncate(&preview, 120),
                None => "Has recibido un nuevo mensaje.".to_string(),
            },
        },
        EventConfig {
            event_type: "user_mentioned",
            category: "messaging",
            importance: Importance::Normal,
            default_url: "/workspace",
            title: |d| match text(d, "mentioned_by.name") {
                Some(name) => format!("{name} te ha mencionado"),
                None => "Te han mencionado".to_string(),
            },
            description: |d| {
                let place = text(d, "workspace.name")
                    .map(|w| format!(" en \"{w}\""))
                    .unwrap_or_default();
                format!("Has sido mencionado en una conversación{place}.")
            },
        },
        // Admin
        EventConfig {
            event_type: "new_feedback",
            category: "admin",
            importance: Importance::High,
            default_url: "/admin/feedback",
            title: |d| match text(d, "school.name") {
                Some(school) => format!("Nuevo feedback: {school}"),
                None => "Nuevo feedback recibido".to_string(),
            },
            description: |d| match text(d, "feedback_preview") {
                Some(preview) => format!("{}...", truncate(&preview, 100)),
                None => "Un usuario ha enviado nuevo feedback.".to_string(),
            },
        },
        EventConfig {
            event_type: "consultant_assigned",
            category: "admin",
            importance: Importance::Normal,
            default_url: "/mi-perfil",
            title: |d| match text(d, "consultant.name") {
                Some(name) => format!("Nuevo consultor asignado: {name}"),
                None => "Consultor asignado".to_string(),
            },
            description: |d| match text(d, "consultant.name") {
                Some(name) => format!("{name} ha sido asignado como tu consultor."),
                None => "Se te ha asignado un nuevo consultor.".to_string(),
            },
        },
        // QA testing
        EventConfig {
            event_type: "qa_test_failed",
            category: "admin",
            importance: Importance::High,
            default_url: "/admin/qa",
            title: |d| match text(d, "scenario_name") {
                Some(name) => format!("QA Fallo: {name}"),
                None => "Fallo en prueba QA".to_string(),
            },
            description: |d| {
                let step = text(d, "step_index")
                    .filter(|s| s != "0")
                    .map(|s| format!("Paso {s}"))
                    .unwrap_or_else(|| "Un paso".to_string());
                let instruction = text_or(d, "step_instruction", "Sin descripción");
                let tester = text(d, "tester_email")
                    .map(|t| format!(" (probado por {t})"))
                    .unwrap_or_default();
                format!("{step} falló: \"{instruction}\"{tester}")
            },
        },
        EventConfig {
            event_type: "qa_scenario_assigned",
            category: "qa",
            importance: Importance::Normal,
            default_url: "/qa",
            title: |d| {
                let count = scenario_count(d);
                if count > 1 {
                    format!("{count} escenarios QA asignados")
                } else {
                    "Nuevo escenario QA asignado".to_string()
                }
            },
            description: |d| {
                let count = scenario_count(d);
                let due = date(d, "due_date")
                    .map(|due| format!(" Fecha límite: {due}."))
                    .unwrap_or_default();
                let first = string_list(d, "scenario_names").and_then(|n| n.into_iter().next());
                match first {
                    Some(name) if count == 1 => {
                        format!("Se te ha asignado el escenario \"{name}\".{due}")
                    }
                    _ => format!("Se te han asignado {count} escenarios para pruebas QA.{due}"),
                }
            },
        },
        // Consultor sessions
        EventConfig {
            event_type: "session_edit_request_submitted",
            category: "sessions",
            importance: Importance::High,
            default_url: "/admin/sessions/approvals",
            title: |d| match text(d, "session.title") {
                Some(title) => format!("Solicitud de cambio: {title}"),
                None => "Nueva solicitud de cambio en sesión".to_string(),
            },
            description: |d| {
                let fields = string_list(d, "changed_fields")
                    .map(|f| f.join(", "))
                    .unwrap_or_else(|| "campos".to_string());
                let requester = text_or(d, "requester.name", "Un consultor");
                format!("{requester} solicita cambios en {fields}.")
            },
        },
        EventConfig {
            event_type: "session_edit_request_approved",
            category: "sessions",
            importance: Importance::Normal,
            default_url: "/consultor/sessions",
            title: |d| match text(d, "session.title") {
                Some(title) => format!("Cambios aprobados: {title}"),
                None => "Solicitud de cambio aprobada".to_string(),
            },
            description: |d| {
                let fields = string_list(d, "changed_fields")
                    .map(|f| f.join(", "))
                    .unwrap_or_else(|| "los campos solicitados".to_string());
                let notes = text(d, "review_notes")
                    .map(|n| format!(" Nota: {n}"))
                    .unwrap_or_default();
                format!("Los cambios en {fields} han sido aprobados.{notes}")
            },
        },
        EventConfig {
            event_type: "session_edit_request_rejected",
            category: "sessions",
            importance: Importance::Normal,
            default_url: "/consultor/sessions",
            title: |d| match text(d, "session.title") {
                Some(title) => format!("Cambios rechazados: {title}"),
                None => "Solicitud de cambio rechazada".to_string(),
            },
            description: |d| {
                let notes = text(d, "review_notes")
                    .map(|n| format!(" Motivo: {n}"))
                    .unwrap_or_default();
                format!("Su solicitud de cambios ha sido rechazada.{notes}")
            },
        },
        EventConfig {
            event_type: "session_reminder_24h",
            category: "sessions",
            importance: Importance::Normal,
            default_url: "/consultor/sessions",
            title: |d| match text(d, "session.title") {
                Some(title) => format!("Recordatorio: {title} mañana"),
                None => "Sesión programada para mañana".to_string(),
            },
            description: |d| {
                let day = text_or(d, "session.date", "mañana");
                let time = text(d, "session.time")
                    .map(|t| format!(" a las {t}"))
                    .unwrap_or_default();
                format!("Tiene una sesión programada para {day}{time}.")
            },
        },
        EventConfig {
            event_type: "session_reminder_1h",
            category: "sessions",
            importance: Importance::High,
            default_url: "/consultor/sessions",
            title: |d| match text(d, "session.title") {
                Some(title) => format!("{title} comienza en 1 hora"),
                None => "Sesión comienza en 1 hora".to_string(),
            },
            description: |d| {
                let link = if text(d, "session.meeting_link").is_some() {
                    " El enlace de reunión está disponible en la sesión."
                } else {
                    ""
                };
                format!("Su sesión está por comenzar.{link}")
            },
        },
        // Licitaciones
        licitacion(
            "licitacion_created",
            Importance::Normal,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Nueva licitacion: {n}"),
                None => "Nueva licitacion creada".to_string(),
            },
            |d| {
                format!(
                    "Se ha creado la licitacion {} para {}.",
                    text_or(d, "numero_licitacion", ""),
                    text_or(d, "school_name", "una escuela")
                )
            },
        ),
        licitacion(
            "licitacion_published",
            Importance::Normal,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Publicacion registrada: {n}"),
                None => "Publicacion registrada".to_string(),
            },
            |d| {
                format!(
                    "La licitacion {} ha sido publicada el {}.",
                    text_or(d, "numero_licitacion", ""),
                    text_or(d, "fecha_publicacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_bases_deadline_1d",
            Importance::High,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Manana vence plazo de bases: {n}"),
                None => "Manana vence plazo de solicitud de bases".to_string(),
            },
            |d| {
                format!(
                    "El plazo de solicitud de bases para la licitacion {} vence manana.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_bases_deadline",
            Importance::High,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Hoy vence plazo de bases: {n}"),
                None => "Hoy vence plazo de solicitud de bases".to_string(),
            },
            |d| {
                format!(
                    "El plazo de solicitud de bases para la licitacion {} vence hoy.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_consultas_deadline_1d",
            Importance::High,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Manana vence plazo de consultas: {n}"),
                None => "Manana vence plazo de consultas".to_string(),
            },
            |d| {
                format!(
                    "El plazo de consultas para la licitacion {} vence manana.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_consultas_deadline",
            Importance::High,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Hoy vence plazo de consultas: {n}"),
                None => "Hoy vence plazo de consultas".to_string(),
            },
            |d| {
                format!(
                    "El plazo de consultas para la licitacion {} vence hoy.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_propuestas_open",
            Importance::Normal,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Ventana de propuestas abierta: {n}"),
                None => "Ventana de propuestas abierta".to_string(),
            },
            |d| {
                format!(
                    "La ventana de recepcion de propuestas para la licitacion {} ya esta abierta.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_propuestas_deadline_1d",
            Importance::High,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Manana vence plazo de propuestas: {n}"),
                None => "Manana vence plazo de propuestas".to_string(),
            },
            |d| {
                format!(
                    "El plazo de recepcion de propuestas para la licitacion {} vence manana.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_propuestas_deadline",
            Importance::High,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Hoy vence plazo de propuestas: {n}"),
                None => "Hoy vence plazo de propuestas".to_string(),
            },
            |d| {
                format!(
                    "El plazo de recepcion de propuestas para la licitacion {} vence hoy.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_evaluacion_start",
            Importance::Normal,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Evaluacion iniciada: {n}"),
                None => "Periodo de evaluacion iniciado".to_string(),
            },
            |d| {
                format!(
                    "El periodo de evaluacion para la licitacion {} ha comenzado.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_evaluacion_deadline_1d",
            Importance::High,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Manana vence plazo de evaluacion: {n}"),
                None => "Manana vence plazo de evaluacion".to_string(),
            },
            |d| {
                format!(
                    "El plazo de evaluacion para la licitacion {} vence manana.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_evaluacion_complete",
            Importance::Normal,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Evaluacion completada: {n}"),
                None => "Evaluacion completada".to_string(),
            },
            |d| {
                let winner = text(d, "ganador_nombre")
                    .map(|w| format!(" ATE ganadora: {w}."))
                    .unwrap_or_default();
                format!(
                    "La evaluacion de la licitacion {} ha sido completada.{winner}",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_adjudicada",
            Importance::High,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Licitacion adjudicada: {n}"),
                None => "Licitacion adjudicada".to_string(),
            },
            |d| {
                let winner = text(d, "ganador_nombre")
                    .map(|w| format!(" ATE seleccionada: {w}."))
                    .unwrap_or_default();
                format!(
                    "La licitacion {} ha sido adjudicada.{winner}",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        licitacion(
            "licitacion_contrato_generado",
            Importance::Normal,
            |d| match text(d, "numero_licitacion") {
                Some(n) => format!("Contrato generado: {n}"),
                None => "Contrato generado".to_string(),
            },
            |d| {
                format!(
                    "Se ha generado el contrato para la licitacion {}.",
                    text_or(d, "numero_licitacion", "")
                )
            },
        ),
        // System
        EventConfig {
            event_type: "system_update",
            category: CATEGORY_SYSTEM,
            importance: Importance::Low,
            default_url: "/dashboard",
            title: |d| text_or(d, "update_title", "Actualización del sistema"),
            description: |d| {
                text_or(
                    d,
                    "update_message",
                    "Hay una nueva actualización disponible en la plataforma.",
                )
            },
        },
    ];

    configs.into_iter().map(|c| (c.event_type, c)).collect()
}

fn licitacion(
    event_type: &'static str,
    importance: Importance,
    title: TextGenerator,
    description: TextGenerator,
) -> EventConfig {
    EventConfig {
        event_type,
        category: "licitaciones",
        importance,
        default_url: "/licitaciones",
        title,
        description,
    }
}

fn scenario_count(d: &EventData) -> u64 {
    lookup_path(d, "scenario_count")
        .and_then(|v| v.as_u64())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(value: serde_json::Value) -> EventData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn assignment_created_uses_title_and_due_date() {
        let cfg = event_config("assignment_created").unwrap();
        let d = data(json!({
            "assignment": {"id": 9, "title": "Ensayo", "due_date": "2026-11-03T12:00:00Z"}
        }));
        assert_eq!(cfg.default_title(&d), "Nueva tarea: Ensayo");
        assert_eq!(
            cfg.default_description(&d),
            "Tienes asignada la tarea \"Ensayo\". Fecha límite: 03-11-2026."
        );
        assert_eq!(cfg.importance, Importance::Normal);
        assert_eq!(cfg.category, "assignments");
    }

    #[test]
    fn generators_tolerate_empty_payload() {
        let empty = EventData::new();
        for event_type in registered_event_types() {
            let cfg = event_config(event_type).unwrap();
            assert!(!cfg.default_title(&empty).is_empty(), "{event_type}");
            assert!(!cfg.default_description(&empty).is_empty(), "{event_type}");
        }
    }

    #[test]
    fn message_preview_is_truncated() {
        let cfg = event_config("message_sent").unwrap();
        let long = "x".repeat(300);
        let d = data(json!({"message_preview": long}));
        assert_eq!(cfg.default_description(&d).chars().count(), 120);
    }

    #[test]
    fn qa_scenario_single_name() {
        let cfg = event_config("qa_scenario_assigned").unwrap();
        let d = data(json!({"scenario_count": 1, "scenario_names": ["Login"]}));
        assert_eq!(cfg.default_title(&d), "Nuevo escenario QA asignado");
        assert_eq!(
            cfg.default_description(&d),
            "Se te ha asignado el escenario \"Login\"."
        );
        let many = data(json!({"scenario_count": 3}));
        assert_eq!(cfg.default_title(&many), "3 escenarios QA asignados");
    }

    #[test]
    fn licitacion_events_share_category_and_url() {
        let cfg = event_config("licitacion_adjudicada").unwrap();
        assert_eq!(cfg.category, "licitaciones");
        assert_eq!(cfg.default_url, "/licitaciones");
        assert_eq!(cfg.importance, Importance::High);
        let d = data(json!({"numero_licitacion": "L-12", "ganador_nombre": "ATE Sur"}));
        assert_eq!(
            cfg.default_description(&d),
            "La licitacion L-12 ha sido adjudicada. ATE seleccionada: ATE Sur."
        );
    }

    #[test]
    fn unknown_type_falls_back_to_generic_defaults() {
        assert!(!has_event_config("brand_new_event"));
        let cfg = event_config_or_fallback("brand_new_event");
        assert_eq!(cfg.default_title(&EventData::new()), "Nueva notificación");
        assert_eq!(cfg.default_url, "/dashboard");
        assert_eq!(cfg.category, CATEGORY_SYSTEM);
    }

    #[test]
    fn registered_types_are_sorted_and_complete() {
        let types = registered_event_types();
        assert!(types.windows(2).all(|w| w[0] < w[1]));
        assert!(types.contains(&"system_update"));
        assert!(types.contains(&"session_reminder_1h"));
    }
}
