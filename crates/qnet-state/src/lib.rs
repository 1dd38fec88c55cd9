//! State store contract (C2): a transactional key-value abstraction over
//! the chain, accounts, and snapshots, plus the sync sub-protocol.
//! `spec.md` §4.2 and §9 treat the engine as a contract — the in-memory
//! `adapters::memory::InMemoryStateStore` is the reference implementation;
//! `adapters::rocks::RocksStateStore` (feature `rocks`) is the production
//! substitution point over the same trait.

pub mod adapters;
pub mod domain;
pub mod keys;
pub mod ports;
pub mod sync;

pub use adapters::InMemoryStateStore;
pub use domain::{SnapshotPayload, SnapshotRef, StateError};
pub use ports::StateStore;
