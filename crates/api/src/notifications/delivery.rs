//! Event-to-inbox delivery loop.
//!
//! Delivery is fire-and-forget. When the receiver falls behind the broadcast
//! buffer, the notifications carried by the skipped events are lost; the loop
//! logs how many events it missed and carries on with the next one.

use capstone_db::repositories::NotificationRepo;
use capstone_db::DbPool;
use capstone_events::PlatformEvent;
use tokio::sync::broadcast;

/// Persists the [`NotificationDraft`](capstone_core::notification::NotificationDraft)s
/// attached to platform events into the `notifications` table.
pub struct NotificationDelivery {
    pool: DbPool,
}

impl NotificationDelivery {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the delivery loop.
    ///
    /// Exits when the channel is closed, i.e. when the last
    /// [`EventBus`](capstone_events::EventBus) handle is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.deliver(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification delivery lagged, some notifications were not stored"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification delivery shutting down");
                    break;
                }
            }
        }
    }

    /// Store every draft of one event. A failed insert is logged and does
    /// not stop the remaining drafts.
    async fn deliver(&self, event: &PlatformEvent) {
        for draft in &event.notifications {
            match NotificationRepo::create(&self.pool, draft).await {
                Ok(id) => tracing::debug!(
                    notification_id = id,
                    recipient_id = draft.recipient_id,
                    event_type = %event.event_type,
                    "Notification stored"
                ),
                Err(e) => tracing::error!(
                    error = %e,
                    recipient_id = draft.recipient_id,
                    event_type = %event.event_type,
                    "Failed to store notification"
                ),
            }
        }
    }
}
