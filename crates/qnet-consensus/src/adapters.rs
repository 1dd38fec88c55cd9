//! Wires the pure round/slashing/difficulty domain logic to the shared
//! event bus and to this node's block/mempool adapters. Mirrors the
//! choreography in `qnet-lifecycle::adapters`: consensus publishes
//! `ViolationDetected`/`PingWindowAccrued`/`MacroblockSealed`/
//! `TransactionsConfirmed` and consumes `EligibilityChanged` from C4.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use qnet_bus::{EventPublisher, NodeEvent};
use qnet_crypto::hashing::{block_hash, tx_fingerprint};
use qnet_types::block::Macroblock;
use qnet_types::node::{NodeId, ViolationKind};
use qnet_types::{Address, Hash32};

use crate::domain::difficulty::RoundDifficulty;
use crate::domain::identity::{address_of, node_id_of};
use crate::domain::slashing::SlashingLedger;
use crate::ports::{BlockSink, TransactionSource};

pub struct ConsensusEngine {
    eligible: RwLock<HashSet<NodeId>>,
    slashing: RwLock<SlashingLedger>,
    difficulty: RwLock<RoundDifficulty>,
    bus: Arc<dyn EventPublisher>,
    block_sink: Arc<dyn BlockSink>,
    tx_source: Arc<dyn TransactionSource>,
}

impl ConsensusEngine {
    pub fn new(
        bus: Arc<dyn EventPublisher>,
        block_sink: Arc<dyn BlockSink>,
        tx_source: Arc<dyn TransactionSource>,
    ) -> Self {
        Self {
            eligible: RwLock::new(HashSet::new()),
            slashing: RwLock::new(SlashingLedger::new()),
            difficulty: RwLock::new(RoundDifficulty::new()),
            bus,
            block_sink,
            tx_source,
        }
    }

    /// Seeds the eligible set at startup, before any `EligibilityChanged`
    /// events arrive (the round driver would otherwise elect from an
    /// empty set on its first round).
    pub fn seed_eligible(&self, nodes: impl IntoIterator<Item = NodeId>) {
        self.eligible.write().extend(nodes);
    }

    pub fn eligible_nodes(&self) -> Vec<NodeId> {
        self.eligible.read().iter().cloned().collect()
    }

    /// The eligible set as on-chain addresses, for leader election.
    /// `NodeId` strings that don't parse back to a valid address are
    /// dropped rather than panicking — a malformed id can never have
    /// been minted by `identity::node_id_of` in the first place.
    pub fn eligible_addresses(&self) -> Vec<Address> {
        self.eligible.read().iter().filter_map(|id| address_of(id)).collect()
    }

    pub fn handle_lifecycle_event(&self, event: NodeEvent) {
        if let NodeEvent::EligibilityChanged { node_id, consensus_eligible } = event {
            let mut set = self.eligible.write();
            if consensus_eligible {
                set.insert(node_id);
            } else {
                set.remove(&node_id);
            }
        } else {
            warn!("consensus engine received an event outside its subscription");
        }
    }

    /// Records a proposer's microblock for `(round, micro_index)`;
    /// publishes `ViolationDetected { DoubleSign }` when it conflicts
    /// with an earlier, different block for the same slot.
    pub async fn observe_microblock(&self, node: Address, round: u64, micro_index: u32, block: &qnet_types::block::Microblock) {
        let hash = crate::domain::microblock::microblock_hash(block);
        let evidence = self
            .slashing
            .write()
            .check_and_record(node, round, micro_index, hash);
        if let Some(ev) = evidence {
            self.bus
                .publish(NodeEvent::ViolationDetected { node_id: node_id_of(ev.node), kind: ViolationKind::DoubleSign, round: ev.round })
                .await;
        }
    }

    pub async fn report_consensus_failure(&self, node_id: NodeId, round: u64) {
        self.bus
            .publish(NodeEvent::ViolationDetected { node_id, kind: ViolationKind::ConsensusFailure, round })
            .await;
    }

    pub async fn report_invalid_block(&self, node_id: NodeId, round: u64) {
        self.bus
            .publish(NodeEvent::ViolationDetected { node_id, kind: ViolationKind::InvalidBlock, round })
            .await;
    }

    pub async fn report_ping_window(&self, node_id: NodeId, window: u64, amount: u128) {
        self.bus
            .publish(NodeEvent::PingWindowAccrued { node_id, window, amount })
            .await;
    }

    /// Commits a sealed macroblock to the state store, drops its
    /// transactions from the mempool, and announces both outcomes.
    pub async fn seal_macroblock(&self, block: Macroblock) -> Result<(), String> {
        let height = block.header.height;
        let leader = block.header.leader;
        let fingerprints: Vec<Hash32> = block
            .microblocks
            .iter()
            .flat_map(|m| m.transactions.iter().map(tx_fingerprint))
            .collect();
        let hash = block_hash(&block);

        self.block_sink.append_block(&block)?;
        self.tx_source.remove_confirmed(&fingerprints);

        self.bus
            .publish(NodeEvent::MacroblockSealed { height, leader, block_hash: hash })
            .await;
        self.bus
            .publish(NodeEvent::TransactionsConfirmed { block_height: height, fingerprints })
            .await;
        Ok(())
    }

    pub fn adjust_difficulty(&self, round: u64, actual_total_secs: u64) {
        self.difficulty.write().maybe_adjust(round, actual_total_secs);
    }

    /// The current difficulty target `elect_leader` compares a round's
    /// normalized combined-reveal hash against (`spec.md` §4.5.b).
    pub fn theta(&self) -> f64 {
        self.difficulty.read().theta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use qnet_bus::InMemoryEventBus;
    use qnet_types::block::BlockHeader;

    struct FakeBlockSink {
        blocks: Mutex<Vec<Macroblock>>,
    }

    impl BlockSink for FakeBlockSink {
        fn append_block(&self, block: &Macroblock) -> Result<(), String> {
            self.blocks.lock().push(block.clone());
            Ok(())
        }
        fn height(&self) -> u64 {
            self.blocks.lock().len() as u64
        }
        fn latest_block(&self) -> Option<Macroblock> {
            self.blocks.lock().last().cloned()
        }
    }

    struct FakeTxSource;
    impl TransactionSource for FakeTxSource {
        fn get_for_inclusion(&self, _max_count: usize, _max_bytes: usize) -> Vec<qnet_types::transaction::Transaction> {
            Vec::new()
        }
        fn remove_confirmed(&self, _hashes: &[Hash32]) {}
    }

    fn sample_block(height: u64) -> Macroblock {
        Macroblock {
            header: BlockHeader {
                height,
                round: height,
                prev_hash: [0u8; 32],
                microblocks_root: [0u8; 32],
                leader: [1u8; 32],
                timestamp: 0,
            },
            microblocks: vec![],
        }
    }

    #[tokio::test]
    async fn sealing_a_macroblock_publishes_both_events() {
        let bus = Arc::new(InMemoryEventBus::new());
        let sub = bus.subscribe(qnet_bus::EventFilter::all());
        let sink = Arc::new(FakeBlockSink { blocks: Mutex::new(Vec::new()) });
        let engine = ConsensusEngine::new(bus.clone(), sink.clone(), Arc::new(FakeTxSource));

        engine.seal_macroblock(sample_block(1)).await.unwrap();

        assert_eq!(sink.height(), 1);
        drop(sub);
        assert_eq!(bus.events_published(), 2);
    }

    #[tokio::test]
    async fn conflicting_microblock_publishes_double_sign() {
        let bus = Arc::new(InMemoryEventBus::new());
        let sink = Arc::new(FakeBlockSink { blocks: Mutex::new(Vec::new()) });
        let engine = ConsensusEngine::new(bus.clone(), sink, Arc::new(FakeTxSource));

        let mb_a = qnet_types::block::Microblock {
            round: 1,
            index: 0,
            proposer: [1u8; 32],
            prev_hash: [0u8; 32],
            transactions: vec![],
            tx_merkle_root: [0u8; 32],
            timestamp: 1,
            signature: vec![],
        };
        let mut mb_b = mb_a.clone();
        mb_b.timestamp = 2;

        engine.observe_microblock([1u8; 32], 1, 0, &mb_a).await;
        engine.observe_microblock([1u8; 32], 1, 0, &mb_b).await;

        assert_eq!(bus.events_published(), 1);
    }

    #[test]
    fn eligibility_events_update_the_cached_set() {
        let bus: Arc<dyn EventPublisher> = Arc::new(InMemoryEventBus::new());
        let sink = Arc::new(FakeBlockSink { blocks: Mutex::new(Vec::new()) });
        let engine = ConsensusEngine::new(bus, sink, Arc::new(FakeTxSource));

        engine.handle_lifecycle_event(NodeEvent::EligibilityChanged { node_id: "n1".into(), consensus_eligible: true });
        assert_eq!(engine.eligible_nodes(), vec!["n1".to_string()]);

        engine.handle_lifecycle_event(NodeEvent::EligibilityChanged { node_id: "n1".into(), consensus_eligible: false });
        assert!(engine.eligible_nodes().is_empty());
    }
}
