//! Typed key-builders for the logical layout of `spec.md` §6, shared by
//! every adapter so they agree on physical layout without duplicating
//! string formatting.

use qnet_types::node::NodeId;
use qnet_types::{Address, Hash32};

pub fn block_key(height: u64) -> String {
    format!("blocks/{height}")
}

pub fn account_key(addr: &Address) -> String {
    format!("accounts/{}", hex::encode(addr))
}

pub fn tx_index_key(hash: &Hash32) -> String {
    format!("tx_index/{}", hex::encode(hash))
}

pub fn snapshot_key(height: u64) -> String {
    format!("snapshots/{height}")
}

pub fn node_key(node_id: &NodeId) -> String {
    format!("nodes/{node_id}")
}

pub fn consumed_proof_key(proof_ref: &str) -> String {
    format!("consumed_proofs/{proof_ref}")
}
