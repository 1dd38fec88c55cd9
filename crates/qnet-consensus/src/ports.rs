//! Outbound collaborators this crate needs from the state store (C2) and
//! the mempool (C3). Named narrowly here rather than depending on those
//! crates' full port traits directly, so `qnet-node` (the composition
//! root) is free to adapt whatever concrete store/pool it wires in.

use qnet_types::block::Macroblock;
use qnet_types::transaction::Transaction;
use qnet_types::Hash32;

pub trait BlockSink: Send + Sync {
    fn append_block(&self, block: &Macroblock) -> Result<(), String>;
    fn height(&self) -> u64;
    fn latest_block(&self) -> Option<Macroblock>;
}

pub trait TransactionSource: Send + Sync {
    fn get_for_inclusion(&self, max_count: usize, max_bytes: usize) -> Vec<Transaction>;
    fn remove_confirmed(&self, hashes: &[Hash32]);
}
