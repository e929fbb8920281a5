//! Capstone event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope. Lifecycle operations
//!   publish one per committed change, carrying the notifications it owes.
//!
//! Durable delivery of those notifications is handled by the API server,
//! which subscribes to the bus at startup.

pub mod bus;

pub use bus::{event_types, EventBus, PlatformEvent};
