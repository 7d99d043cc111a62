//! Integration tests for the notification repositories.
//!
//! Exercises the constraints the dispatch engine relies on:
//! - idempotency key collisions are silent no-ops
//! - digest entries are unique per notification
//! - delayed rows are claimed exactly once
//! - broadcast pages walk active users without overlap

use chrono::{Duration, NaiveTime, Utc};
use genera_core::notification::{DigestType, DispatchStatus, Importance};
use genera_db::models::delayed_notification::NewDelayedNotification;
use genera_db::models::notification::NewNotification;
use genera_db::models::notification_event::NewNotificationEvent;
use genera_db::models::notification_preference::UpsertPreferences;
use genera_db::models::notification_trigger::CreateNotificationTrigger;
use genera_db::models::user::CreateUser;
use genera_db::repositories::{
    DelayedNotificationRepo, DigestQueueRepo, NotificationEventRepo, NotificationPreferenceRepo,
    NotificationRepo, NotificationTriggerRepo, UserRepo,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str, active: bool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            full_name: None,
            is_active: Some(active),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_notification(user_id: i64, key: &str) -> NewNotification {
    NewNotification {
        user_id,
        title: "Nueva tarea asignada: Ensayo".to_string(),
        description: Some("Se te ha asignado una nueva tarea".to_string()),
        category: "assignments".to_string(),
        related_url: Some("/assignments/9".to_string()),
        importance: Importance::High,
        event_type: Some("assignment_created".to_string()),
        idempotency_key: Some(key.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_idempotency_collision_is_noop(pool: PgPool) {
    genera_db::health_check(&pool).await.unwrap();
    let user = seed_user(&pool, "ana@genera.cl", true).await;

    let first = NotificationRepo::insert_if_absent(&pool, &new_notification(user, "k1"))
        .await
        .unwrap();
    let row = first.expect("first insert creates a row");
    assert_eq!(row.importance, "high");
    assert_eq!(row.event_type.as_deref(), Some("assignment_created"));
    assert!(!row.is_read);

    let second = NotificationRepo::insert_if_absent(&pool, &new_notification(user, "k1"))
        .await
        .unwrap();
    assert!(second.is_none());

    let rows = NotificationRepo::list_for_user(&pool, user, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_null_keys_do_not_collide(pool: PgPool) {
    let user = seed_user(&pool, "beto@genera.cl", true).await;
    let mut n = new_notification(user, "unused");
    n.idempotency_key = None;

    assert!(NotificationRepo::insert_if_absent(&pool, &n).await.unwrap().is_some());
    assert!(NotificationRepo::insert_if_absent(&pool, &n).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_similar_notification_window(pool: PgPool) {
    let user = seed_user(&pool, "carla@genera.cl", true).await;
    let n = new_notification(user, "k2");
    NotificationRepo::insert_if_absent(&pool, &n).await.unwrap();

    let since = Utc::now() - Duration::seconds(60);
    assert!(NotificationRepo::exists_similar_since(&pool, user, &n.title, None, since)
        .await
        .unwrap());
    assert!(NotificationRepo::exists_similar_since(
        &pool,
        user,
        &n.title,
        n.description.as_deref(),
        since
    )
    .await
    .unwrap());
    assert!(!NotificationRepo::exists_similar_since(
        &pool,
        user,
        &n.title,
        Some("otra descripción"),
        since
    )
    .await
    .unwrap());

    let future = Utc::now() + Duration::seconds(60);
    assert!(!NotificationRepo::exists_similar_since(&pool, user, &n.title, None, future)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_read_sets_read_at(pool: PgPool) {
    let user = seed_user(&pool, "dora@genera.cl", true).await;
    let row = NotificationRepo::insert_if_absent(&pool, &new_notification(user, "k3"))
        .await
        .unwrap()
        .unwrap();

    assert!(NotificationRepo::mark_read(&pool, row.id, user).await.unwrap());
    assert!(!NotificationRepo::mark_read(&pool, row.id, user).await.unwrap());

    let stored = NotificationRepo::find_by_idempotency_key(&pool, "k3")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_read);
    assert!(stored.read_at.is_some());
}

// ---------------------------------------------------------------------------
// Triggers and preferences
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_active_triggers_are_listed(pool: PgPool) {
    for (active, title) in [(true, "A"), (false, "B"), (true, "C")] {
        NotificationTriggerRepo::create(
            &pool,
            &CreateNotificationTrigger {
                event_type: "message_sent".to_string(),
                category: "messaging".to_string(),
                notification_template: json!({"title_template": title}),
                is_active: Some(active),
            },
        )
        .await
        .unwrap();
    }

    let triggers = NotificationTriggerRepo::list_active_for_event(&pool, "message_sent")
        .await
        .unwrap();
    let titles: Vec<String> = triggers
        .iter()
        .filter_map(|t| t.template())
        .map(|t| t.title_template)
        .collect();
    assert_eq!(titles, vec!["A", "C"]);

    let none = NotificationTriggerRepo::list_active_for_event(&pool, "course_assigned")
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_preferences_upsert_round_trip(pool: PgPool) {
    let user = seed_user(&pool, "eva@genera.cl", true).await;
    assert!(NotificationPreferenceRepo::find_for_user(&pool, user)
        .await
        .unwrap()
        .is_none());

    let mut input = UpsertPreferences::defaults_for(user);
    input.max_per_hour = 3;
    input.quiet_hours_start = NaiveTime::from_hms_opt(21, 30, 0).unwrap();
    input.notification_settings = json!({"message_sent": {"frequency": "weekly"}});
    NotificationPreferenceRepo::upsert(&pool, &input).await.unwrap();

    input.do_not_disturb = true;
    NotificationPreferenceRepo::upsert(&pool, &input).await.unwrap();

    let prefs = NotificationPreferenceRepo::find_for_user(&pool, user)
        .await
        .unwrap()
        .unwrap()
        .into_preferences();
    assert!(prefs.do_not_disturb);
    assert_eq!(prefs.max_per_hour, 3);
    assert_eq!(prefs.quiet_hours_start, NaiveTime::from_hms_opt(21, 30, 0).unwrap());
    assert!(prefs.notification_settings.contains_key("message_sent"));
}

// ---------------------------------------------------------------------------
// Digest queue and delayed notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_digest_entry_unique_per_notification(pool: PgPool) {
    let user = seed_user(&pool, "fran@genera.cl", true).await;
    let row = NotificationRepo::insert_if_absent(&pool, &new_notification(user, "k4"))
        .await
        .unwrap()
        .unwrap();
    let at = Utc::now() + Duration::days(1);

    assert!(DigestQueueRepo::enqueue(&pool, user, row.id, DigestType::Daily, at)
        .await
        .unwrap());
    assert!(!DigestQueueRepo::enqueue(&pool, user, row.id, DigestType::Weekly, at)
        .await
        .unwrap());

    let pending = DigestQueueRepo::list_pending_for_user(&pool, user).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].digest_type, "daily");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delayed_rows_are_claimed_once(pool: PgPool) {
    let user = seed_user(&pool, "gabi@genera.cl", true).await;
    let now = Utc::now();

    let due = NewDelayedNotification {
        notification: new_notification(user, "due"),
        scheduled_for: now - Duration::minutes(5),
        reason: "quiet_hours".to_string(),
    };
    let later = NewDelayedNotification {
        notification: new_notification(user, "later"),
        scheduled_for: now + Duration::hours(8),
        reason: "quiet_hours".to_string(),
    };
    assert!(DelayedNotificationRepo::insert_if_absent(&pool, &due).await.unwrap().is_some());
    assert!(DelayedNotificationRepo::insert_if_absent(&pool, &due).await.unwrap().is_none());
    DelayedNotificationRepo::insert_if_absent(&pool, &later).await.unwrap();

    let claimed = DelayedNotificationRepo::claim_due(&pool, now, 50).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].idempotency_key.as_deref(), Some("due"));
    assert_eq!(claimed[0].to_new_notification(), due.notification);

    let again = DelayedNotificationRepo::claim_due(&pool, now, 50).await.unwrap();
    assert!(again.is_empty());

    let pending = DelayedNotificationRepo::list_pending_for_user(&pool, user).await.unwrap();
    assert_eq!(pending.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unclaimed_row_is_claimable_again(pool: PgPool) {
    let user = seed_user(&pool, "rocio@genera.cl", true).await;
    let now = Utc::now();
    let due = NewDelayedNotification {
        notification: new_notification(user, "retry"),
        scheduled_for: now - Duration::minutes(1),
        reason: "quiet_hours".to_string(),
    };
    DelayedNotificationRepo::insert_if_absent(&pool, &due).await.unwrap();

    let claimed = DelayedNotificationRepo::claim_due(&pool, now, 10).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert!(DelayedNotificationRepo::unclaim(&pool, claimed[0].id).await.unwrap());
    assert!(!DelayedNotificationRepo::unclaim(&pool, -1).await.unwrap());

    let pending = DelayedNotificationRepo::list_pending_for_user(&pool, user).await.unwrap();
    assert_eq!(pending.len(), 1);
    let again = DelayedNotificationRepo::claim_due(&pool, now, 10).await.unwrap();
    assert_eq!(again.len(), 1);
}

// ---------------------------------------------------------------------------
// Users and audit log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_active_user_pages_do_not_overlap(pool: PgPool) {
    let mut active = Vec::new();
    for i in 0..7 {
        let id = seed_user(&pool, &format!("u{i}@genera.cl"), i != 3).await;
        if i != 3 {
            active.push(id);
        }
    }

    let mut seen: Vec<i64> = Vec::new();
    let mut cursor = None;
    loop {
        let page = UserRepo::active_ids_after(&pool, cursor, 2).await.unwrap();
        seen.extend(&page);
        if page.len() < 2 {
            break;
        }
        cursor = page.last().copied();
    }
    assert_eq!(seen, active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audit_log_append(pool: PgPool) {
    let id = NotificationEventRepo::insert(
        &pool,
        &NewNotificationEvent {
            event_type: "system_update".to_string(),
            event_data: json!({"message": "Mantención"}),
            trigger_id: None,
            notifications_created: 0,
            status: DispatchStatus::Failed,
            error_message: Some("recipient lookup failed".to_string()),
        },
    )
    .await
    .unwrap();

    let rows = NotificationEventRepo::list_recent_for_event(&pool, "system_update", 5)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].status, "failed");
}
