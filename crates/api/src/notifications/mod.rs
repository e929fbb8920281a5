//! Notification delivery.
//!
//! [`NotificationDelivery`] subscribes to the event bus and stores the
//! notifications carried by each committed lifecycle event.

pub mod delivery;

pub use delivery::NotificationDelivery;
