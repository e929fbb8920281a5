//! Notification delivery from the event bus into the inbox table.

mod common;

use capstone_api::notifications::NotificationDelivery;
use capstone_core::notification::{NotificationDraft, Severity};
use capstone_db::repositories::NotificationRepo;
use capstone_events::{event_types, EventBus, PlatformEvent};
use common::{create_user, STUDENT};
use sqlx::PgPool;

fn reminder(recipient_id: i64, n: usize) -> PlatformEvent {
    PlatformEvent::new(event_types::COMMENT_ADDED).with_notifications([NotificationDraft::new(
        recipient_id,
        format!("Reminder {n}"),
        "Check your project",
        Severity::Info,
    )])
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn drafts_of_lagged_events_are_dropped(pool: PgPool) {
    let student = create_user(&pool, "student", STUDENT).await;
    let bus = EventBus::new(1);
    let receiver = bus.subscribe();

    // Capacity 1: the first two events are overwritten before delivery runs.
    for n in 0..3 {
        bus.publish(reminder(student.id, n));
    }
    drop(bus);
    NotificationDelivery::new(pool.clone()).run(receiver).await;

    let stored = NotificationRepo::list_for_user(&pool, student.id, false, None, None)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Reminder 2");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn every_draft_of_a_delivered_event_is_stored(pool: PgPool) {
    let student = create_user(&pool, "student", STUDENT).await;
    let other = create_user(&pool, "other", STUDENT).await;
    let bus = EventBus::default();
    let receiver = bus.subscribe();

    bus.publish(
        PlatformEvent::new(event_types::COUNCIL_CREATED).with_notifications([
            NotificationDraft::new(student.id, "Council", "Seated", Severity::Info),
            NotificationDraft::new(other.id, "Council", "Seated", Severity::Info),
        ]),
    );
    drop(bus);
    NotificationDelivery::new(pool.clone()).run(receiver).await;

    for id in [student.id, other.id] {
        assert_eq!(NotificationRepo::unread_count(&pool, id).await.unwrap(), 1);
    }
}
