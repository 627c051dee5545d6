//! Domain events and the realtime publish/subscribe bus.
//!
//! Delivery is at-most-once: the bus never stores events and a subscriber that
//! falls behind loses the events it missed. Stored notifications are the
//! durable record; the bus is only a low-latency hint.

pub mod broadcast_bus;
pub mod bus;
pub mod envelope;
pub mod event;

pub use broadcast_bus::{BroadcastEventBus, DEFAULT_CAPACITY};
pub use bus::{EventBus, Subscription};
pub use envelope::{Channel, EventEnvelope};
pub use event::DomainEvent;
