use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{info, warn};

use qnet_crypto::hashing::block_header_hash;
use qnet_types::{AccountState, Address, Block, Hash32, Transaction};

use crate::domain::errors::StateError;
use crate::domain::snapshot::{SnapshotPayload, SnapshotRef};
use crate::ports::StateStore;

struct Inner {
    blocks_by_height: Vec<Block>,
    blocks_by_hash: HashMap<Hash32, u64>,
    accounts: HashMap<Address, AccountState>,
    tx_index: HashMap<Hash32, (u64, usize)>,
    total_issued: u128,
    snapshots: HashMap<u64, SnapshotRef>,
}

impl Inner {
    fn new() -> Self {
        Self {
            blocks_by_height: Vec::new(),
            blocks_by_hash: HashMap::new(),
            accounts: HashMap::new(),
            tx_index: HashMap::new(),
            total_issued: 0,
            snapshots: HashMap::new(),
        }
    }

    fn tip_hash(&self) -> Hash32 {
        self.blocks_by_height.last().map(|b| block_header_hash(&b.header)).unwrap_or([0u8; 32])
    }
}

/// In-process reference implementation of the `StateStore` contract,
/// guarded by a single `RwLock` (`spec.md` §4.2/§5: single-writer,
/// concurrent-lock-free-where-possible readers — this adapter favors
/// correctness over the lock-free reader guarantee; `adapters::rocks`
/// is the production substitution point).
pub struct InMemoryStateStore {
    inner: RwLock<Inner>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::new()) }
    }

    fn apply_transaction(accounts: &mut HashMap<Address, AccountState>, tx: &Transaction) -> Result<(), StateError> {
        let sender_state = accounts.entry(tx.sender).or_insert_with(|| AccountState::empty(tx.sender));
        let debit = tx.amount.saturating_add(tx.fee);
        if sender_state.balance < debit {
            return Err(StateError::InsufficientFunds(tx.sender));
        }
        sender_state.balance -= debit;
        sender_state.nonce += 1;

        let recipient_state = accounts.entry(tx.recipient).or_insert_with(|| AccountState::empty(tx.recipient));
        recipient_state.balance = recipient_state.balance.saturating_add(tx.amount);
        Ok(())
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for InMemoryStateStore {
    fn append_block(&self, block: Block) -> Result<(), StateError> {
        let mut inner = self.inner.write();
        let expected_height = inner.blocks_by_height.len() as u64;
        if block.header.height != expected_height {
            return Err(StateError::HeightConflict { expected: expected_height, got: block.header.height });
        }
        if block.header.prev_hash != inner.tip_hash() {
            return Err(StateError::BrokenLink);
        }

        // Stage mutations on a scratch copy so a mid-block failure leaves
        // the committed account map untouched.
        let mut scratch = inner.accounts.clone();
        for microblock in &block.microblocks {
            for tx in &microblock.transactions {
                Self::apply_transaction(&mut scratch, tx)?;
            }
        }

        let block_hash = block_header_hash(&block.header);
        let height = block.header.height;
        let mut tx_offset = 0usize;
        for microblock in &block.microblocks {
            for tx in &microblock.transactions {
                let fingerprint = qnet_crypto::hashing::tx_fingerprint(tx);
                inner.tx_index.insert(fingerprint, (height, tx_offset));
                tx_offset += 1;
            }
        }
        inner.accounts = scratch;
        inner.blocks_by_hash.insert(block_hash, height);
        inner.blocks_by_height.push(block);
        info!(height, "block appended");
        Ok(())
    }

    fn get_block_by_height(&self, height: u64) -> Option<Block> {
        self.inner.read().blocks_by_height.get(height as usize).cloned()
    }

    fn get_block_by_hash(&self, hash: &Hash32) -> Option<Block> {
        let inner = self.inner.read();
        inner.blocks_by_hash.get(hash).and_then(|h| inner.blocks_by_height.get(*h as usize).cloned())
    }

    fn latest_block(&self) -> Option<Block> {
        self.inner.read().blocks_by_height.last().cloned()
    }

    fn height(&self) -> u64 {
        self.inner.read().blocks_by_height.len() as u64
    }

    fn get_account(&self, addr: &Address) -> Option<AccountState> {
        self.inner.read().accounts.get(addr).copied()
    }

    fn get_transaction(&self, hash: &Hash32) -> Option<(u64, usize, Transaction)> {
        let inner = self.inner.read();
        let (height, offset) = *inner.tx_index.get(hash)?;
        let block = inner.blocks_by_height.get(height as usize)?;
        let tx = block.microblocks.iter().flat_map(|m| m.transactions.iter()).nth(offset)?.clone();
        Some((height, offset, tx))
    }

    fn create_snapshot(&self, height: u64) -> Result<SnapshotRef, StateError> {
        let inner = self.inner.read();
        let block = inner.blocks_by_height.get(height as usize).ok_or(StateError::SnapshotBehindTip(height))?;
        let payload = SnapshotPayload {
            height,
            header: block.header.clone(),
            accounts: inner.accounts.values().copied().collect(),
            total_issued: inner.total_issued,
        };
        Ok(SnapshotRef::seal(payload))
    }

    fn apply_snapshot(&self, snapshot: SnapshotRef) -> Result<(), StateError> {
        if !snapshot.verify_content_hash() {
            return Err(StateError::SnapshotHashMismatch);
        }
        let mut inner = self.inner.write();
        if snapshot.payload.height < inner.blocks_by_height.len() as u64 {
            warn!(height = snapshot.payload.height, "refusing to apply snapshot behind current tip");
            return Err(StateError::SnapshotBehindTip(snapshot.payload.height));
        }
        let height = snapshot.payload.height;
        inner.total_issued = snapshot.payload.total_issued;
        inner.accounts = snapshot.payload.accounts.clone().into_iter().map(|a| (a.address, a)).collect();
        inner.snapshots.insert(height, snapshot);
        Ok(())
    }

    fn iterate_range(&self, from: u64, to: u64) -> Vec<Block> {
        let inner = self.inner.read();
        let from = from as usize;
        let to = (to as usize).min(inner.blocks_by_height.len());
        if from >= to {
            return Vec::new();
        }
        inner.blocks_by_height[from..to].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qnet_types::{BlockHeader, Macroblock};

    fn genesis() -> Block {
        Macroblock {
            header: BlockHeader { height: 0, round: 0, prev_hash: [0u8; 32], microblocks_root: [0u8; 32], leader: [0u8; 32], timestamp: 0 },
            microblocks: vec![],
        }
    }

    #[test]
    fn append_genesis_then_reports_height_one() {
        let store = InMemoryStateStore::new();
        store.append_block(genesis()).unwrap();
        assert_eq!(store.height(), 1);
        assert!(store.latest_block().is_some());
    }

    #[test]
    fn append_rejects_wrong_height() {
        let store = InMemoryStateStore::new();
        let mut bad = genesis();
        bad.header.height = 5;
        let err = store.append_block(bad).unwrap_err();
        assert!(matches!(err, StateError::HeightConflict { .. }));
    }

    #[test]
    fn append_rejects_broken_link() {
        let store = InMemoryStateStore::new();
        store.append_block(genesis()).unwrap();
        let mut next = genesis();
        next.header.height = 1;
        next.header.prev_hash = [9u8; 32];
        let err = store.append_block(next).unwrap_err();
        assert!(matches!(err, StateError::BrokenLink));
    }

    #[test]
    fn snapshot_round_trips() {
        let store = InMemoryStateStore::new();
        store.append_block(genesis()).unwrap();
        let snap = store.create_snapshot(0).unwrap();
        assert!(snap.verify_content_hash());

        let store2 = InMemoryStateStore::new();
        store2.append_block(genesis()).unwrap();
        store2.apply_snapshot(snap).unwrap();
    }

    #[test]
    fn iterate_range_is_half_open() {
        let store = InMemoryStateStore::new();
        store.append_block(genesis()).unwrap();
        let mut second = genesis();
        second.header.height = 1;
        second.header.prev_hash = block_header_hash(&genesis().header);
        store.append_block(second).unwrap();

        let got = store.iterate_range(0, 2);
        assert_eq!(got.len(), 2);
        assert_eq!(store.iterate_range(0, 1).len(), 1);
    }
}
