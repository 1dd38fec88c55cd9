//! `commit_hash = H(nonce || round || node)` (`spec.md` §4.5.a). A node
//! commits to this hash during the commit window and discloses `nonce`
//! during reveal; the hash is recomputed and compared. The disclosed
//! nonce doubles as the round's entropy contribution — there is no
//! separate "committed value" beyond it.

use qnet_crypto::hashing::{hash, HashAlgorithm};
use qnet_types::{Address, Hash32};

pub fn commit_hash(nonce: [u8; 32], round: u64, node: Address) -> Hash32 {
    let mut buf = [0u8; 72];
    buf[0..32].copy_from_slice(&nonce);
    buf[32..40].copy_from_slice(&round.to_be_bytes());
    buf[40..72].copy_from_slice(&node);
    hash(&buf, HashAlgorithm::Sha256)
}

pub fn verify_reveal(commitment: Hash32, nonce: [u8; 32], round: u64, node: Address) -> bool {
    commit_hash(nonce, round, node) == commitment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_reveal_verifies() {
        let node = [1u8; 32];
        let c = commit_hash([7u8; 32], 1, node);
        assert!(verify_reveal(c, [7u8; 32], 1, node));
    }

    #[test]
    fn wrong_nonce_fails_verification() {
        let node = [1u8; 32];
        let c = commit_hash([7u8; 32], 1, node);
        assert!(!verify_reveal(c, [8u8; 32], 1, node));
    }

    #[test]
    fn wrong_node_fails_verification() {
        let c = commit_hash([7u8; 32], 1, [1u8; 32]);
        assert!(!verify_reveal(c, [7u8; 32], 1, [2u8; 32]));
    }
}
