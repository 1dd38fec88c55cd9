//! Microblock validation: one per second within a round, produced by the
//! elected leader (`spec.md` §4.5.c). Validates the chain link, the
//! proposer, the in-round index, and the included-transaction digest.

pub use qnet_crypto::hashing::block_hash as tx_block_hash;
use qnet_crypto::merkle::merkle_root;
use qnet_types::block::Microblock;
use qnet_types::{Address, Hash32};

use crate::domain::errors::ConsensusError;

/// Target cadence for microblock production.
pub const MICROBLOCK_INTERVAL_SECS: u64 = 1;
/// Slack allowed between a microblock's declared timestamp and the
/// validator's local clock before it's considered stale.
pub const TIMESTAMP_SLACK_SECS: u64 = 5;

pub fn validate_microblock(
    mb: &Microblock,
    expected_prev_hash: Hash32,
    expected_proposer: &Address,
    expected_index: u32,
    now: u64,
) -> Result<(), ConsensusError> {
    if mb.prev_hash != expected_prev_hash {
        return Err(ConsensusError::BrokenLink);
    }
    if mb.proposer != *expected_proposer {
        return Err(ConsensusError::WrongProposer);
    }
    if mb.index != expected_index {
        return Err(ConsensusError::WrongIndex);
    }
    let drift = now.saturating_sub(mb.timestamp).max(mb.timestamp.saturating_sub(now));
    if drift > TIMESTAMP_SLACK_SECS {
        return Err(ConsensusError::StaleTimestamp);
    }

    let fingerprints: Vec<Hash32> = mb
        .transactions
        .iter()
        .map(qnet_crypto::hashing::tx_fingerprint)
        .collect();
    if merkle_root(&fingerprints) != mb.tx_merkle_root {
        return Err(ConsensusError::MerkleMismatch);
    }

    Ok(())
}

pub fn microblock_hash(mb: &Microblock) -> Hash32 {
    qnet_crypto::hashing::hash(&mb.signing_payload(), qnet_crypto::hashing::HashAlgorithm::Sha256)
}

// Re-exported for callers that hash a full macroblock by its header.
pub use tx_block_hash as macroblock_hash;
