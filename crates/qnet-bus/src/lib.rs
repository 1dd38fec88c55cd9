//! In-process event bus carrying the choreography events between
//! consensus (C5) and the lifecycle engine (C4), per `spec.md` §9's
//! design note: an event bus in place of a cyclic C4↔C5 reference.

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, NodeEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
