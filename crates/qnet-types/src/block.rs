use serde::{Deserialize, Serialize};

use crate::{Address, Hash32, Transaction};

/// A microblock: the one-second cadence unit produced by the round's
/// elected leader, per `spec.md` §3/§4.5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Microblock {
    pub round: u64,
    pub index: u32,
    pub proposer: Address,
    pub prev_hash: Hash32,
    pub transactions: Vec<Transaction>,
    pub tx_merkle_root: Hash32,
    pub timestamp: u64,
    pub signature: Vec<u8>,
}

impl Microblock {
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(96);
        buf.extend_from_slice(&self.round.to_be_bytes());
        buf.extend_from_slice(&self.index.to_be_bytes());
        buf.extend_from_slice(&self.proposer);
        buf.extend_from_slice(&self.prev_hash);
        buf.extend_from_slice(&self.tx_merkle_root);
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf
    }
}

/// A commit in the round's commit-reveal leader election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub round: u64,
    pub node: Address,
    pub commitment: Hash32,
    pub signature: Vec<u8>,
}

/// The opened value behind a `Commit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub round: u64,
    pub node: Address,
    pub nonce: [u8; 32],
    pub signature: Vec<u8>,
}

/// Header of a sealed macroblock: everything needed to verify the block
/// without holding its full microblock bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: u64,
    pub round: u64,
    pub prev_hash: Hash32,
    pub microblocks_root: Hash32,
    pub leader: Address,
    pub timestamp: u64,
}

/// A sealed macroblock: header plus the microblocks it commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macroblock {
    pub header: BlockHeader,
    pub microblocks: Vec<Microblock>,
}

/// Alias used where either granularity is accepted by a storage API.
pub type Block = Macroblock;
