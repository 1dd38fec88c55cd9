//! Wiring between the node registry and the event bus (`spec.md` §9):
//! consensus publishes `ViolationDetected`/`PingWindowAccrued`, this
//! service consumes them and republishes `EligibilityChanged` whenever a
//! node's consensus eligibility flips as a result.

use std::sync::Arc;

use tracing::warn;

use qnet_bus::{EventFilter, EventPublisher, EventTopic, NodeEvent, Subscription};
use qnet_types::node::NodeId;

use crate::domain::registry::NodeRegistry;

pub struct LifecycleService {
    pub registry: Arc<NodeRegistry>,
    pub bus: Arc<dyn EventPublisher>,
}

impl LifecycleService {
    pub fn new(registry: Arc<NodeRegistry>, bus: Arc<dyn EventPublisher>) -> Self {
        Self { registry, bus }
    }

    pub fn lifecycle_filter() -> EventFilter {
        EventFilter::topics(vec![EventTopic::Lifecycle])
    }

    /// Applies one event sourced from consensus and republishes
    /// `EligibilityChanged` on a flip. Callers drive this from a
    /// `Subscription`/`EventStream` obtained from the shared bus.
    pub async fn handle_event(&self, event: NodeEvent, now: u64) {
        match event {
            NodeEvent::ViolationDetected { node_id, kind, round: _ } => {
                let before = self.registry.is_consensus_eligible(&node_id);
                match self.registry.apply_violation(&node_id, kind, now) {
                    Ok(_) => {
                        let after = self.registry.is_consensus_eligible(&node_id);
                        if before != after {
                            self.bus
                                .publish(NodeEvent::EligibilityChanged {
                                    node_id,
                                    consensus_eligible: after,
                                })
                                .await;
                        }
                    }
                    Err(err) => warn!(%node_id, %err, "violation reported for unknown node"),
                }
            }
            NodeEvent::PingWindowAccrued { node_id, window, amount } => {
                if let Err(err) = self.registry.accrue_reward(&node_id, window, amount) {
                    warn!(%node_id, %err, "reward accrual rejected");
                }
            }
            other => {
                warn!(?other, "lifecycle service received an event outside its subscription");
            }
        }
    }

    /// Driven by a background task on a fixed cadence (`spec.md` §5's
    /// background-sweep task). Publishes `EligibilityChanged { false }`
    /// for every node this pass excluded.
    pub async fn run_inactivity_sweep(&self, now: u64) -> Vec<NodeId> {
        let excluded = self.registry.sweep_inactivity(now);
        for node_id in &excluded {
            self.bus
                .publish(NodeEvent::EligibilityChanged {
                    node_id: node_id.clone(),
                    consensus_eligible: false,
                })
                .await;
        }
        excluded
    }

    pub async fn drain_once(&self, subscription: &mut Subscription, now: u64) -> bool {
        match subscription.recv().await {
            Ok(event) => {
                self.handle_event(event, now).await;
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AlwaysVerifyOracle;
    use qnet_bus::InMemoryEventBus;
    use qnet_types::node::{ConsensusPhase, NodeTier, ViolationKind};

    #[tokio::test]
    async fn violation_event_that_drops_eligibility_republishes_change() {
        let registry = Arc::new(NodeRegistry::new());
        let bus: Arc<dyn EventPublisher> = Arc::new(InMemoryEventBus::new());
        let oracle = AlwaysVerifyOracle;
        registry
            .activate(
                "node-1".to_string(),
                "wallet-1".to_string(),
                NodeTier::Full,
                ConsensusPhase::Phase1,
                "proof-1".to_string(),
                1500,
                &oracle,
                0,
            )
            .unwrap();

        let service = LifecycleService::new(registry.clone(), bus);

        service
            .handle_event(
                NodeEvent::ViolationDetected { node_id: "node-1".into(), kind: ViolationKind::ConsensusFailure, round: 1 },
                1,
            )
            .await;

        let node = registry.get("node-1").unwrap();
        assert!(node.reputation < 70.0);
    }
}
