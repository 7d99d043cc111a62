//! Per-event-type dispatch routes.
//!
//! Every event type the engine knows is registered here with two things:
//! how to find its recipients in the payload and which payload field
//! distinguishes one logical event from another for idempotency.

use std::collections::HashMap;
use std::sync::LazyLock;

use genera_core::idempotency::Discriminator;

/// Where the recipients of an event come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientRule {
    /// A list of user IDs at one path.
    List(&'static str),
    /// A single user ID at one path.
    Single(&'static str),
    /// The list at the first path, or the single ID at the second when the
    /// list is absent or empty.
    ListOrSingle(&'static str, &'static str),
    /// Every ID (list or single) found at any of the paths.
    Union(&'static [&'static str]),
    /// Every active user.
    Broadcast,
}

#[derive(Debug, Clone, Copy)]
pub struct EventRoute {
    pub recipients: RecipientRule,
    pub discriminator: Discriminator,
}

static ROUTES: LazyLock<HashMap<&'static str, EventRoute>> = LazyLock::new(build_routes);

/// The route for an event type, if one is registered.
pub fn route(event_type: &str) -> Option<&'static EventRoute> {
    ROUTES.get(event_type)
}

/// The discriminator for an event type. Unknown types hash the payload.
pub fn discriminator(event_type: &str) -> Discriminator {
    route(event_type)
        .map(|r| r.discriminator)
        .unwrap_or(Discriminator::Payload)
}

const LICITACION_RECIPIENTS: RecipientRule =
    RecipientRule::Union(&["encargado_ids", "admin_ids", "recipient_ids"]);
const LICITACION_ID: Discriminator = Discriminator::FirstOf(&["licitacion_id", "licitacion.id"]);

fn build_routes() -> HashMap<&'static str, EventRoute> {
    use Discriminator::{Composite, FirstOf};
    use RecipientRule::{Broadcast, List, ListOrSingle, Single, Union};

    let route = |recipients, discriminator| EventRoute {
        recipients,
        discriminator,
    };

    let mut routes = HashMap::from([
        // Courses
        (
            "course_assigned",
            route(
                ListOrSingle("assigned_users", "student_id"),
                FirstOf(&["course.id", "course_id"]),
            ),
        ),
        (
            "course_completed",
            route(Single("student_id"), Composite("course.id", "student_id")),
        ),
        (
            "module_completed",
            route(Single("student_id"), Composite("module.id", "student_id")),
        ),
        (
            "learning_path_assigned",
            route(
                ListOrSingle("assigned_users", "user_id"),
                FirstOf(&["learning_path.id", "learning_path_id"]),
            ),
        ),
        // Assignments
        (
            "assignment_created",
            route(
                ListOrSingle("assigned_users", "student_id"),
                FirstOf(&["assignment.id", "assignment_id"]),
            ),
        ),
        (
            "assignment_feedback",
            route(
                Single("student_id"),
                FirstOf(&["feedback_id", "submission_id", "assignment.id"]),
            ),
        ),
        (
            "assignment_due_soon",
            route(
                Single("student_id"),
                FirstOf(&["assignment.id", "assignment_id"]),
            ),
        ),
        // Messaging
        (
            "message_sent",
            route(Single("recipient_id"), FirstOf(&["message_id"])),
        ),
        (
            "user_mentioned",
            route(
                Single("mentioned_user_id"),
                FirstOf(&["mention_id", "message_id"]),
            ),
        ),
        // Admin
        (
            "new_feedback",
            route(List("admin_ids"), FirstOf(&["feedback_id"])),
        ),
        (
            "consultant_assigned",
            route(
                Single("student_id"),
                Composite("consultant.id", "student_id"),
            ),
        ),
        // QA
        (
            "qa_test_failed",
            route(List("admin_ids"), FirstOf(&["test_run_id", "scenario_id"])),
        ),
        (
            "qa_scenario_assigned",
            route(
                ListOrSingle("tester_ids", "tester_id"),
                FirstOf(&["assignment_id", "scenario_ids"]),
            ),
        ),
        // Consultor sessions
        (
            "session_edit_request_submitted",
            route(List("admin_ids"), FirstOf(&["request_id"])),
        ),
        (
            "session_edit_request_approved",
            route(Single("requester.id"), FirstOf(&["request_id"])),
        ),
        (
            "session_edit_request_rejected",
            route(Single("requester.id"), FirstOf(&["request_id"])),
        ),
        (
            "session_reminder_24h",
            route(
                Union(&["facilitator_ids", "participant_ids"]),
                FirstOf(&["session.id", "session_id"]),
            ),
        ),
        (
            "session_reminder_1h",
            route(
                Union(&["facilitator_ids", "participant_ids"]),
                FirstOf(&["session.id", "session_id"]),
            ),
        ),
        // System
        (
            "system_update",
            route(Broadcast, FirstOf(&["update_id", "version"])),
        ),
    ]);

    for event_type in [
        "licitacion_created",
        "licitacion_published",
        "licitacion_bases_deadline_1d",
        "licitacion_bases_deadline",
        "licitacion_consultas_deadline_1d",
        "licitacion_consultas_deadline",
        "licitacion_propuestas_open",
        "licitacion_propuestas_deadline_1d",
        "licitacion_propuestas_deadline",
        "licitacion_evaluacion_start",
        "licitacion_evaluacion_deadline_1d",
        "licitacion_evaluacion_complete",
        "licitacion_adjudicada",
        "licitacion_contrato_generado",
    ] {
        routes.insert(event_type, route(LICITACION_RECIPIENTS, LICITACION_ID));
    }

    routes
}

#[cfg(test)]
mod tests {
    use genera_core::event_config::registered_event_types;

    use super::*;

    fn routed_event_types() -> Vec<&'static str> {
        let mut types: Vec<_> = ROUTES.keys().copied().collect();
        types.sort_unstable();
        types
    }

    #[test]
    fn every_configured_event_type_has_a_route() {
        assert_eq!(routed_event_types(), registered_event_types());
    }

    #[test]
    fn unknown_event_hashes_payload() {
        assert!(route("nonexistent").is_none());
        assert_eq!(discriminator("nonexistent"), Discriminator::Payload);
    }

    #[test]
    fn assignment_created_reads_assigned_users() {
        let r = route("assignment_created").unwrap();
        assert_eq!(
            r.recipients,
            RecipientRule::ListOrSingle("assigned_users", "student_id")
        );
    }

    #[test]
    fn system_update_broadcasts() {
        assert_eq!(
            route("system_update").unwrap().recipients,
            RecipientRule::Broadcast
        );
    }
}
