//! Composition root: wires C1-C5 behind the shared event bus, following
//! the teacher's `SubsystemContainer` dependency-ordered initialization
//! (`node-runtime::container::subsystems`), generalized to QNet's three
//! coupled systems instead of the teacher's ten.

use std::sync::Arc;

use tracing::info;

use qnet_bus::{EventPublisher, InMemoryEventBus};
use qnet_consensus::ConsensusEngine;
use qnet_crypto::envelope::{address_of, keygen, PublicKey, SecretKey};
use qnet_lifecycle::{AlwaysVerifyOracle, LifecycleService, NodeRegistry, ProofOracle};
use qnet_mempool::{MempoolApi, MempoolService, TransactionPool as MempoolPool};
use qnet_state::{InMemoryStateStore, StateStore};
use qnet_types::node::{ConsensusPhase, NodeId, NodeTier};
use qnet_types::Address;

use crate::adapters::{MempoolTxSource, StateAccountView, StateBlockSink};
use crate::config::NodeConfig;
use crate::genesis::{build_genesis, GenesisConfig};

/// This node's own validator identity, generated fresh at each startup.
/// There is no persisted keystore (`spec.md` §9 leaves key custody
/// out of scope); a restart therefore re-activates under a new node id.
pub struct LocalValidator {
    pub address: Address,
    pub node_id: NodeId,
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

/// Central container holding every long-lived subsystem instance.
///
/// ## Initialization order
///
/// 1. Shared infrastructure: event bus.
/// 2. C2 state store, seeded with the genesis macroblock if empty.
/// 3. C3 mempool, reading account state from C2.
/// 4. C4 node registry, wired to the bus.
/// 5. C5 consensus engine, wired to the bus, C2 and C3 via narrow ports.
pub struct CoreContext {
    pub config: NodeConfig,
    pub bus: Arc<InMemoryEventBus>,
    pub state: Arc<dyn StateStore>,
    pub mempool: Arc<dyn MempoolApi>,
    pub registry: Arc<NodeRegistry>,
    pub lifecycle: Arc<LifecycleService>,
    pub consensus: Arc<ConsensusEngine>,
    pub local_validator: LocalValidator,
}

impl CoreContext {
    pub fn new(config: NodeConfig) -> Self {
        info!("initializing QNet core: event bus");
        let bus: Arc<InMemoryEventBus> = Arc::new(InMemoryEventBus::new());

        info!("initializing C2 state store");
        let state: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
        if state.height() == 0 && state.latest_block().is_none() {
            let genesis = build_genesis(GenesisConfig::default());
            if let Err(err) = state.append_block(genesis) {
                panic!("failed to seed genesis block: {err}");
            }
        }

        info!(max_transactions = config.mempool.max_transactions, "initializing C3 mempool");
        let pool = MempoolPool::new(config.mempool.max_transactions, config.mempool.min_gas_price as u128);
        let accounts = Arc::new(StateAccountView::new(state.clone()));
        let mempool: Arc<dyn MempoolApi> = Arc::new(MempoolService::new(pool, accounts));

        info!("initializing C4 node registry");
        let registry = Arc::new(NodeRegistry::new());
        let lifecycle = Arc::new(LifecycleService::new(registry.clone(), bus.clone() as Arc<dyn EventPublisher>));

        info!("initializing C5 consensus engine");
        let block_sink = Arc::new(StateBlockSink::new(state.clone()));
        let tx_source = Arc::new(MempoolTxSource::new(mempool.clone()));
        let consensus = Arc::new(ConsensusEngine::new(
            bus.clone() as Arc<dyn EventPublisher>,
            block_sink,
            tx_source,
        ));

        info!("activating local validator identity");
        let local_validator = Self::self_activate(&registry, &consensus);

        info!("QNet core initialized at height {}", state.height());

        Self { config, bus, state, mempool, registry, lifecycle, consensus, local_validator }
    }

    /// Generates a fresh keypair and activates it as a `Full`-tier node
    /// using the always-verify oracle, then seeds it into the consensus
    /// engine's eligible set. There is no multi-operator onboarding flow
    /// here (`spec.md` §9): a production deployment would instead drive
    /// `NodeRegistry::activate` from an `IngressMessage::Activate`.
    fn self_activate(registry: &Arc<NodeRegistry>, consensus: &Arc<ConsensusEngine>) -> LocalValidator {
        let (public_key, secret_key) = keygen();
        let address = address_of(&public_key);
        let node_id = qnet_consensus::domain::identity::node_id_of(address);

        let oracle = AlwaysVerifyOracle;
        registry
            .activate(
                node_id.clone(),
                format!("self-{node_id}"),
                NodeTier::Full,
                ConsensusPhase::Phase1,
                format!("bootstrap-{node_id}"),
                0,
                &oracle,
                0,
            )
            .expect("self-activation with a fresh node id cannot conflict");
        consensus.seed_eligible([node_id.clone()]);

        LocalValidator { address, node_id, public_key, secret_key }
    }

    /// Proof oracle for node activation; always-verify in the reference
    /// build since burn/transfer observation is an out-of-scope
    /// collaborator (`spec.md` §9).
    pub fn proof_oracle(&self) -> Arc<dyn ProofOracle> {
        Arc::new(AlwaysVerifyOracle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_context_seeds_genesis_once() {
        let ctx = CoreContext::new(NodeConfig::default());
        assert_eq!(ctx.state.height(), 1);
        assert_eq!(ctx.mempool.size(), 0);
        assert_eq!(ctx.registry.active_count(), 1);
    }

    #[test]
    fn local_validator_is_seeded_as_eligible() {
        let ctx = CoreContext::new(NodeConfig::default());
        assert_eq!(ctx.consensus.eligible_addresses(), vec![ctx.local_validator.address]);
    }
}
