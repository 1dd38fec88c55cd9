use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use qnet_types::{Hash32, Transaction};

use crate::domain::errors::RejectionReason;
use crate::domain::pool::TransactionPool;
use crate::ports::{AccountView, MempoolApi};

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Adapts `TransactionPool` to the `MempoolApi` inbound port, pairing it
/// with a live `AccountView` (normally backed by `qnet-state`).
pub struct MempoolService {
    pool: TransactionPool,
    accounts: Arc<dyn AccountView>,
}

impl MempoolService {
    pub fn new(pool: TransactionPool, accounts: Arc<dyn AccountView>) -> Self {
        Self { pool, accounts }
    }

    pub fn prune_expired(&self) {
        self.pool.prune_expired(now_unix());
    }
}

impl MempoolApi for MempoolService {
    fn add_transaction(&self, tx: Transaction) -> Result<Hash32, RejectionReason> {
        self.pool.add_transaction(tx, self.accounts.as_ref(), now_unix())
    }

    fn get_for_inclusion(&self, max_count: usize, max_bytes: usize) -> Vec<Transaction> {
        self.pool.get_for_inclusion(max_count, max_bytes)
    }

    fn remove_confirmed(&self, hashes: &[Hash32]) {
        self.pool.remove_confirmed(hashes)
    }

    fn size(&self) -> usize {
        self.pool.size()
    }

    fn get(&self, fingerprint: &Hash32) -> Option<Transaction> {
        self.pool.get(fingerprint)
    }
}
