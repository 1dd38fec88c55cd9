//! Binary Merkle tree over already-hashed leaves, odd leaves duplicated,
//! per `spec.md` §4.1.

use qnet_types::Hash32;

use crate::hashing::{hash, HashAlgorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

pub type MerkleStep = (Side, Hash32);

fn parent(left: Hash32, right: Hash32) -> Hash32 {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(&left);
    buf.extend_from_slice(&right);
    hash(&buf, HashAlgorithm::Sha256)
}

/// Returns `[0u8;32]` for an empty leaf set, matching the convention that
/// an empty microblock still has a well-defined (all-zero) root.
pub fn merkle_root(leaves: &[Hash32]) -> Hash32 {
    if leaves.is_empty() {
        return [0u8; 32];
    }
    let mut level: Vec<Hash32> = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level.chunks(2).map(|pair| parent(pair[0], pair[1])).collect();
    }
    level[0]
}

/// Returns the authentication path from `leaves[index]` to the root, as a
/// sequence of `(side, sibling)` steps where `side` is the sibling's
/// position relative to the running hash.
pub fn merkle_proof(leaves: &[Hash32], index: usize) -> Vec<MerkleStep> {
    if leaves.is_empty() || index >= leaves.len() {
        return Vec::new();
    }
    let mut level: Vec<Hash32> = leaves.to_vec();
    let mut idx = index;
    let mut proof = Vec::new();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
        let side = if idx % 2 == 0 { Side::Right } else { Side::Left };
        proof.push((side, level[sibling_idx]));
        level = level.chunks(2).map(|pair| parent(pair[0], pair[1])).collect();
        idx /= 2;
    }
    proof
}

pub fn verify_proof(leaf: Hash32, proof: &[MerkleStep], root: Hash32) -> bool {
    let mut current = leaf;
    for (side, sibling) in proof {
        current = match side {
            Side::Right => parent(current, *sibling),
            Side::Left => parent(*sibling, current),
        };
    }
    current == root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::{hash, HashAlgorithm};

    fn leaf(n: u8) -> Hash32 {
        hash(&[n], HashAlgorithm::Sha256)
    }

    #[test]
    fn single_leaf_root_is_the_leaf_duplicated() {
        let leaves = vec![leaf(1)];
        let root = merkle_root(&leaves);
        assert_eq!(root, parent(leaves[0], leaves[0]));
    }

    #[test]
    fn odd_leaf_count_duplicates_last() {
        let leaves: Vec<Hash32> = (0..3).map(leaf).collect();
        let mut padded = leaves.clone();
        padded.push(leaves[2]);
        assert_eq!(merkle_root(&leaves), merkle_root(&padded));
    }

    #[test]
    fn proof_round_trips_for_every_index() {
        let leaves: Vec<Hash32> = (0..7).map(leaf).collect();
        let root = merkle_root(&leaves);
        for i in 0..leaves.len() {
            let proof = merkle_proof(&leaves, i);
            assert!(verify_proof(leaves[i], &proof, root), "index {i} failed");
        }
    }

    #[test]
    fn proof_rejects_wrong_leaf() {
        let leaves: Vec<Hash32> = (0..4).map(leaf).collect();
        let root = merkle_root(&leaves);
        let proof = merkle_proof(&leaves, 0);
        assert!(!verify_proof(leaf(99), &proof, root));
    }
}
