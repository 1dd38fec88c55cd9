use qnet_types::{Address, Hash32, Transaction};

use crate::domain::errors::RejectionReason;

/// Outbound port: the mempool consults account state but never mutates
/// it — that remains C2's responsibility.
pub trait AccountView: Send + Sync {
    fn current_nonce(&self, addr: &Address) -> u64;
    fn balance(&self, addr: &Address) -> u128;
}

/// Inbound port consumed by the network ingress task and the round
/// driver.
pub trait MempoolApi: Send + Sync {
    fn add_transaction(&self, tx: Transaction) -> Result<Hash32, RejectionReason>;
    fn get_for_inclusion(&self, max_count: usize, max_bytes: usize) -> Vec<Transaction>;
    fn remove_confirmed(&self, hashes: &[Hash32]);
    fn size(&self) -> usize;
    fn get(&self, fingerprint: &Hash32) -> Option<Transaction>;
}
