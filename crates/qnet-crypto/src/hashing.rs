use blake2::Blake2b;
use blake2::digest::consts::U32;
use sha2::{Digest, Sha256};
use sha3::Sha3_256;

use qnet_types::{Block, BlockHeader, Hash32, Transaction};

/// Only `Sha256` output may ever enter a block header, transaction
/// fingerprint, or Merkle tree (`spec.md` §4.1). The other variants are
/// offered for internal/diagnostic hashing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha3_256,
    Blake2b256,
}

pub fn hash(bytes: &[u8], algorithm: HashAlgorithm) -> Hash32 {
    match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(bytes).into(),
        HashAlgorithm::Sha3_256 => Sha3_256::digest(bytes).into(),
        HashAlgorithm::Blake2b256 => {
            let digest = Blake2b::<U32>::digest(bytes);
            let mut out = [0u8; 32];
            out.copy_from_slice(&digest);
            out
        }
    }
}

/// Canonical JSON of a value with lexicographically sorted keys, matching
/// `spec.md` §6's serialization rule for hashing-relevant structures.
/// `serde_json::to_value` already sorts map keys when the `preserve_order`
/// feature is not enabled, which this workspace relies on.
fn canonical_json<T: serde::Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("hashing-relevant types always serialize")
}

/// `SHA-256` of the canonical JSON of `tx` with `signature` removed.
pub fn tx_fingerprint(tx: &Transaction) -> Hash32 {
    let mut unsigned = tx.clone();
    unsigned.signature = Vec::new();
    let payload = canonical_json(&unsigned);
    hash(&payload, HashAlgorithm::Sha256)
}

/// `SHA-256` of the canonical JSON of a block header.
pub fn block_header_hash(header: &BlockHeader) -> Hash32 {
    let payload = canonical_json(header);
    hash(&payload, HashAlgorithm::Sha256)
}

/// Convenience wrapper hashing a full macroblock's header.
pub fn block_hash(block: &Block) -> Hash32 {
    block_header_hash(&block.header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        let a = hash(b"payload", HashAlgorithm::Sha256);
        let b = hash(b"payload", HashAlgorithm::Sha256);
        assert_eq!(a, b);
    }

    #[test]
    fn algorithm_variants_diverge() {
        let a = hash(b"payload", HashAlgorithm::Sha256);
        let b = hash(b"payload", HashAlgorithm::Sha3_256);
        let c = hash(b"payload", HashAlgorithm::Blake2b256);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
