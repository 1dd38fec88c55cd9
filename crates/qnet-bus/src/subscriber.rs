use thiserror::Error;
use tokio::sync::broadcast;

use crate::events::{EventFilter, NodeEvent};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("subscriber lagged, {skipped} events dropped")]
    Lagged { skipped: u64 },

    #[error("event bus closed")]
    Closed,
}

pub struct Subscription {
    receiver: broadcast::Receiver<NodeEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub fn new(receiver: broadcast::Receiver<NodeEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Awaits the next event matching this subscription's filter,
    /// silently skipping events that don't match rather than surfacing
    /// them to the caller.
    pub async fn recv(&mut self) -> Result<NodeEvent, SubscriptionError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Ok(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    return Err(SubscriptionError::Lagged { skipped })
                }
                Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }
}

/// A `Stream`-like poll wrapper, for callers that prefer to `select!`
/// over several subscriptions rather than spawn one task per.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    pub async fn next(&mut self) -> Option<NodeEvent> {
        self.subscription.recv().await.ok()
    }
}
