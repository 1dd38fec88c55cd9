//! Domain entities shared across the QNet workspace.
//!
//! This crate holds no business logic — it is the single source of truth
//! for the shapes that cross crate boundaries, per the workspace's
//! hexagonal layering: `qnet-crypto`, `qnet-mempool`, `qnet-state`,
//! `qnet-lifecycle` and `qnet-consensus` all depend on it, never the
//! other way around.

pub mod account;
pub mod block;
pub mod ipc;
pub mod node;
pub mod transaction;

pub use account::AccountState;
pub use block::{Block, BlockHeader, Commit, Macroblock, Microblock, Reveal};
pub use node::{ActivationRecord, NodeRecord, NodeTier, PingRecord, RewardLedgerEntry, ViolationRecord};
pub use transaction::{Transaction, TransactionKind};

/// 32-byte hash used for block headers, transaction fingerprints, and
/// Merkle roots. Always produced by `qnet_crypto::hashing`.
pub type Hash32 = [u8; 32];

/// Bech32-free raw address: the SHA-256 digest of a node's Dilithium
/// public key, matching `qnet_crypto::envelope::address_of`.
pub type Address = [u8; 32];
