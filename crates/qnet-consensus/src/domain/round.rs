//! Round bookkeeping: collects commits and reveals for a macroblock
//! round and elects the leader once the reveal window closes
//! (`spec.md` §4.5.a-b).

use std::collections::HashMap;

use qnet_crypto::hashing::{hash, HashAlgorithm};
use qnet_types::block::{Commit, Reveal};
use qnet_types::Address;

use crate::domain::commit_reveal::verify_reveal;
use crate::domain::errors::ConsensusError;

/// Default commit window, per `spec.md` §4.5.a.
pub const DEFAULT_T_COMMIT_SECS: u64 = 60;
/// Default reveal window, per `spec.md` §4.5.a.
pub const DEFAULT_T_REVEAL_SECS: u64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct RoundTiming {
    pub t_commit_secs: u64,
    pub t_reveal_secs: u64,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            t_commit_secs: DEFAULT_T_COMMIT_SECS,
            t_reveal_secs: DEFAULT_T_REVEAL_SECS,
        }
    }
}

pub struct RoundState {
    pub round: u64,
    commits: HashMap<Address, Commit>,
    reveals: HashMap<Address, [u8; 32]>,
}

impl RoundState {
    pub fn new(round: u64) -> Self {
        Self {
            round,
            commits: HashMap::new(),
            reveals: HashMap::new(),
        }
    }

    pub fn add_commit(&mut self, commit: Commit) -> Result<(), ConsensusError> {
        if commit.round != self.round {
            return Err(ConsensusError::UnknownCommit);
        }
        if self.commits.contains_key(&commit.node) {
            return Err(ConsensusError::DuplicateCommit);
        }
        self.commits.insert(commit.node, commit);
        Ok(())
    }

    pub fn add_reveal(&mut self, reveal: Reveal) -> Result<(), ConsensusError> {
        let commit = self
            .commits
            .get(&reveal.node)
            .ok_or(ConsensusError::UnknownCommit)?;
        if self.reveals.contains_key(&reveal.node) {
            return Err(ConsensusError::DuplicateReveal);
        }
        if !verify_reveal(commit.commitment, reveal.nonce, self.round, reveal.node) {
            return Err(ConsensusError::RevealMismatch);
        }
        self.reveals.insert(reveal.node, reveal.nonce);
        Ok(())
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    pub fn reveal_count(&self) -> usize {
        self.reveals.len()
    }

    /// Combines every disclosed nonce (XOR, order-independent) and
    /// hashes the result. Nodes that committed but never revealed simply
    /// don't contribute entropy; they are not penalized here — that's
    /// `ConsensusFailure`'s job, raised by the caller once it sees the
    /// gap between `commit_count` and `reveal_count`.
    ///
    /// The digest's first eight bytes, normalized into `[0, 1)`, are the
    /// round's difficulty roll: if it lands at or above `theta` the
    /// round fails outright (`spec.md` §4.5.b) rather than electing a
    /// leader. Otherwise the next eight bytes pick the winner's index
    /// into `eligible`.
    pub fn elect_leader(&self, eligible: &[Address], theta: f64) -> Result<Address, ConsensusError> {
        if eligible.is_empty() {
            return Err(ConsensusError::NoEligibleNodes);
        }
        let mut combined = [0u8; 32];
        for value in self.reveals.values() {
            for i in 0..32 {
                combined[i] ^= value[i];
            }
        }
        combined[..8].copy_from_slice(&self.round.to_be_bytes());
        let digest = hash(&combined, HashAlgorithm::Sha256);

        let roll = u64::from_be_bytes(digest[0..8].try_into().unwrap());
        let normalized = roll as f64 / u64::MAX as f64;
        if normalized >= theta {
            return Err(ConsensusError::DifficultyNotMet);
        }

        let index = u64::from_be_bytes(digest[8..16].try_into().unwrap()) as usize % eligible.len();
        Ok(eligible[index])
    }

    pub fn revealed_nodes(&self) -> Vec<Address> {
        self.reveals.keys().copied().collect()
    }

    pub fn committed_not_revealed(&self) -> Vec<Address> {
        self.commits
            .keys()
            .filter(|n| !self.reveals.contains_key(*n))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commit_reveal::commit_hash;

    fn signed_commit(node: Address, round: u64, nonce: [u8; 32]) -> Commit {
        Commit { round, node, commitment: commit_hash(nonce, round, node), signature: Vec::new() }
    }

    fn signed_reveal(node: Address, round: u64, nonce: [u8; 32]) -> Reveal {
        Reveal { round, node, nonce, signature: Vec::new() }
    }

    #[test]
    fn leader_election_is_deterministic_given_same_reveals() {
        let mut round_a = RoundState::new(1);
        let mut round_b = RoundState::new(1);
        for (node, nonce) in [([1u8; 32], [10u8; 32]), ([2u8; 32], [20u8; 32]), ([3u8; 32], [30u8; 32])] {
            round_a.add_commit(signed_commit(node, 1, nonce)).unwrap();
            round_a.add_reveal(signed_reveal(node, 1, nonce)).unwrap();
            round_b.add_commit(signed_commit(node, 1, nonce)).unwrap();
            round_b.add_reveal(signed_reveal(node, 1, nonce)).unwrap();
        }
        let eligible = vec![[1u8; 32], [2u8; 32], [3u8; 32]];
        assert_eq!(round_a.elect_leader(&eligible, 1.0), round_b.elect_leader(&eligible, 1.0));
    }

    #[test]
    fn a_theta_of_zero_never_clears_the_difficulty_target() {
        let mut round = RoundState::new(1);
        round.add_commit(signed_commit([1u8; 32], 1, [10u8; 32])).unwrap();
        round.add_reveal(signed_reveal([1u8; 32], 1, [10u8; 32])).unwrap();

        let err = round.elect_leader(&[[1u8; 32]], 0.0).unwrap_err();
        assert_eq!(err, ConsensusError::DifficultyNotMet);
    }

    #[test]
    fn a_theta_of_one_always_clears_the_difficulty_target() {
        let mut round = RoundState::new(1);
        round.add_commit(signed_commit([1u8; 32], 1, [10u8; 32])).unwrap();
        round.add_reveal(signed_reveal([1u8; 32], 1, [10u8; 32])).unwrap();

        assert!(round.elect_leader(&[[1u8; 32]], 1.0).is_ok());
    }

    #[test]
    fn reveal_without_commit_is_rejected() {
        let mut round = RoundState::new(1);
        let err = round.add_reveal(signed_reveal([9u8; 32], 1, [5u8; 32])).unwrap_err();
        assert_eq!(err, ConsensusError::UnknownCommit);
    }

    #[test]
    fn reveal_with_wrong_value_is_rejected() {
        let mut round = RoundState::new(1);
        round.add_commit(signed_commit([1u8; 32], 1, [9u8; 32])).unwrap();
        let err = round.add_reveal(signed_reveal([1u8; 32], 1, [8u8; 32])).unwrap_err();
        assert_eq!(err, ConsensusError::RevealMismatch);
    }

    #[test]
    fn committed_not_revealed_tracks_gaps() {
        let mut round = RoundState::new(1);
        round.add_commit(signed_commit([1u8; 32], 1, [1u8; 32])).unwrap();
        round.add_commit(signed_commit([2u8; 32], 1, [2u8; 32])).unwrap();
        round.add_reveal(signed_reveal([1u8; 32], 1, [1u8; 32])).unwrap();
        assert_eq!(round.committed_not_revealed(), vec![[2u8; 32]]);
    }
}
