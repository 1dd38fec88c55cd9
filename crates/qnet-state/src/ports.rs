use qnet_types::{AccountState, Address, Block, Hash32, Transaction};

use crate::domain::errors::StateError;
use crate::domain::snapshot::SnapshotRef;

/// The state store contract consumed by the core; the engine behind it
/// is implementation freedom (`spec.md` §4.2).
pub trait StateStore: Send + Sync {
    /// Atomic append at `block.index == current_height + 1`; validates
    /// structural links and applies every transaction's balance/nonce
    /// mutation in order. Either the whole block commits, or nothing.
    fn append_block(&self, block: Block) -> Result<(), StateError>;

    fn get_block_by_height(&self, height: u64) -> Option<Block>;
    fn get_block_by_hash(&self, hash: &Hash32) -> Option<Block>;
    fn latest_block(&self) -> Option<Block>;
    fn height(&self) -> u64;

    fn get_account(&self, addr: &Address) -> Option<AccountState>;
    fn get_transaction(&self, hash: &Hash32) -> Option<(u64, usize, Transaction)>;

    fn create_snapshot(&self, height: u64) -> Result<SnapshotRef, StateError>;
    fn apply_snapshot(&self, snapshot: SnapshotRef) -> Result<(), StateError>;

    /// Inclusive-exclusive range `[from, to)`.
    fn iterate_range(&self, from: u64, to: u64) -> Vec<Block>;
}
