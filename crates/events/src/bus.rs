//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`PlatformEvent`]s.
//! It is shared via `Arc<EventBus>` across the application.

use capstone_core::notification::NotificationDraft;
use capstone_core::types::DbId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

/// Dot-separated names of the events lifecycle operations publish.
pub mod event_types {
    pub const PROJECT_SUBMITTED: &str = "project.submitted";
    pub const PROJECT_APPROVED: &str = "project.approved";
    pub const PROJECT_REJECTED: &str = "project.rejected";
    pub const PROJECT_COMPLETED: &str = "project.completed";
    pub const PROJECT_DELETED: &str = "project.deleted";
    pub const SUPERVISOR_ASSIGNED: &str = "project.supervisor_assigned";
    pub const COMMENT_ADDED: &str = "project.comment_added";
    pub const PROGRESS_REPORTED: &str = "project.progress_reported";
    pub const COUNCIL_CREATED: &str = "council.created";
    pub const COUNCIL_ASSIGNED: &str = "council.assigned";
    pub const COUNCIL_MEMBER_ADDED: &str = "council.member_added";
    pub const SCORE_SUBMITTED: &str = "score.submitted";
    pub const MESSAGE_SENT: &str = "message.sent";
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred in the portal.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods. `notifications` holds the user-facing messages the change
/// produced; subscribers decide how to store or deliver them.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, see [`event_types`].
    pub event_type: String,

    /// Optional source entity kind (e.g. `"project"`, `"council"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// Notifications owed to users because of this event.
    pub notifications: Vec<NotificationDraft>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            notifications: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Append notifications to deliver.
    pub fn with_notifications(
        mut self,
        notifications: impl IntoIterator<Item = NotificationDraft>,
    ) -> Self {
        self.notifications.extend(notifications);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use capstone_events::bus::{EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new("project.submitted"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no active subscribers the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        let event_type = event.event_type.clone();
        if self.sender.send(event).is_err() {
            tracing::debug!(event_type = %event_type, "No subscribers for event");
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use capstone_core::notification::{self, Severity};

    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = PlatformEvent::new(event_types::PROJECT_APPROVED)
            .with_source("project", 42)
            .with_actor(7)
            .with_payload(serde_json::json!({"status": "approved"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "project.approved");
        assert_eq!(received.source_entity_type.as_deref(), Some("project"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["status"], "approved");
    }

    #[tokio::test]
    async fn notifications_travel_with_the_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let drafts = vec![notification::project_approved(3, 42, "Compiler")];
        bus.publish(PlatformEvent::new(event_types::PROJECT_APPROVED).with_notifications(drafts));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.notifications.len(), 1);
        assert_eq!(received.notifications[0].recipient_id, 3);
        assert_eq!(received.notifications[0].severity, Severity::Success);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlatformEvent::new(event_types::SCORE_SUBMITTED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "score.submitted");
        assert_eq!(e2.event_type, "score.submitted");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::new("orphan.event"));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = PlatformEvent::new("bare.event");
        assert!(event.source_entity_type.is_none());
        assert!(event.source_entity_id.is_none());
        assert!(event.actor_user_id.is_none());
        assert!(event.notifications.is_empty());
        assert!(event.payload.is_object());
    }
}
