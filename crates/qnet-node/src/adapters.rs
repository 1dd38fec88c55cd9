//! Adapters binding `qnet-state` and `qnet-mempool`'s inbound ports to
//! `qnet-consensus`'s narrow outbound ports, so the consensus engine
//! never depends on either crate's full surface directly.

use std::sync::Arc;

use qnet_consensus::{BlockSink, TransactionSource};
use qnet_mempool::{AccountView, MempoolApi};
use qnet_state::StateStore;
use qnet_types::{Address, Hash32, Macroblock, Transaction};

pub struct StateBlockSink {
    store: Arc<dyn StateStore>,
}

impl StateBlockSink {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

impl BlockSink for StateBlockSink {
    fn append_block(&self, block: &Macroblock) -> Result<(), String> {
        self.store.append_block(block.clone()).map_err(|err| err.to_string())
    }

    fn height(&self) -> u64 {
        self.store.height()
    }

    fn latest_block(&self) -> Option<Macroblock> {
        self.store.latest_block()
    }
}

pub struct MempoolTxSource {
    mempool: Arc<dyn MempoolApi>,
}

impl MempoolTxSource {
    pub fn new(mempool: Arc<dyn MempoolApi>) -> Self {
        Self { mempool }
    }
}

impl TransactionSource for MempoolTxSource {
    fn get_for_inclusion(&self, max_count: usize, max_bytes: usize) -> Vec<Transaction> {
        self.mempool.get_for_inclusion(max_count, max_bytes)
    }

    fn remove_confirmed(&self, hashes: &[Hash32]) {
        self.mempool.remove_confirmed(hashes)
    }
}

/// Read-only view of account state for the mempool's admission checks;
/// the mempool never mutates C2 directly (`spec.md` §4.3).
pub struct StateAccountView {
    store: Arc<dyn StateStore>,
}

impl StateAccountView {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

impl AccountView for StateAccountView {
    fn current_nonce(&self, addr: &Address) -> u64 {
        self.store.get_account(addr).map(|a| a.nonce).unwrap_or(0)
    }

    fn balance(&self, addr: &Address) -> u128 {
        self.store.get_account(addr).map(|a| a.balance).unwrap_or(0)
    }
}
