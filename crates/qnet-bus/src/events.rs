//! Events carried on the bus. `spec.md` §9's design note replaces the
//! cyclic C4↔C5 reference with this choreography: C5 publishes
//! `ViolationDetected`/`PingWindowAccrued`, C4 subscribes and applies the
//! penalty table without either crate depending on the other's types.

use serde::{Deserialize, Serialize};

use qnet_types::node::{NodeId, ViolationKind};
use qnet_types::{Address, Hash32};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeEvent {
    /// C5 → C4: a node committed a violation during round processing.
    ViolationDetected { node_id: NodeId, kind: ViolationKind, round: u64 },

    /// C5 → C4: a node answered its ping challenge inside an eligible,
    /// reward-eligible window.
    PingWindowAccrued { node_id: NodeId, window: u64, amount: u128 },

    /// C4 → C5: a node's consensus eligibility changed (ban, exclusion,
    /// restoration), so the round driver must refresh its eligible set.
    EligibilityChanged { node_id: NodeId, consensus_eligible: bool },

    /// C5 → C2/C4 observers: a macroblock was sealed.
    MacroblockSealed { height: u64, leader: Address, block_hash: Hash32 },

    /// C5 → C3 observers: a macroblock was sealed, confirmed transactions
    /// must be dropped from the mempool's pending set.
    TransactionsConfirmed { block_height: u64, fingerprints: Vec<Hash32> },

    /// Any subsystem: an `Internal`-class error occurred. Routed to the
    /// dead-letter topic; never silently dropped.
    CriticalError { subsystem: &'static str, message: String },
}

impl NodeEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ViolationDetected { .. }
            | Self::PingWindowAccrued { .. }
            | Self::EligibilityChanged { .. } => EventTopic::Lifecycle,
            Self::MacroblockSealed { .. } => EventTopic::Consensus,
            Self::TransactionsConfirmed { .. } => EventTopic::Mempool,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Lifecycle,
    Consensus,
    Mempool,
    DeadLetterQueue,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    pub fn matches(&self, event: &NodeEvent) -> bool {
        self.topics.is_empty() || self.topics.contains(&EventTopic::All) || self.topics.contains(&event.topic())
    }
}

pub const DLQ_TOPIC: &str = "dlq.critical";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_maps_to_lifecycle_topic() {
        let ev = NodeEvent::ViolationDetected { node_id: "n1".into(), kind: ViolationKind::MissedPing, round: 1 };
        assert_eq!(ev.topic(), EventTopic::Lifecycle);
    }

    #[test]
    fn filter_all_matches_everything() {
        let filter = EventFilter::all();
        let ev = NodeEvent::CriticalError { subsystem: "consensus", message: "oops".into() };
        assert!(filter.matches(&ev));
    }

    #[test]
    fn filter_by_topic_excludes_others() {
        let filter = EventFilter::topics(vec![EventTopic::Consensus]);
        let ev = NodeEvent::TransactionsConfirmed { block_height: 1, fingerprints: vec![] };
        assert!(!filter.matches(&ev));
    }
}
