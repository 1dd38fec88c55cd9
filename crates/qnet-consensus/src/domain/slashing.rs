//! Double-sign detection, grounded in the teacher's Casper-style
//! `SlashingDb` (`qc-09-finality/src/domain/slashing_db.rs`): keyed here
//! by `(proposer, round, micro_index)` instead of `(validator,
//! target_epoch)`, since QNet has no attestation target epochs, only
//! per-slot microblock proposals.

use std::collections::HashMap;

use qnet_types::{Address, Hash32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleSignEvidence {
    pub node: Address,
    pub round: u64,
    pub micro_index: u32,
    pub block_a: Hash32,
    pub block_b: Hash32,
}

#[derive(Default)]
pub struct SlashingLedger {
    seen: HashMap<(Address, u64, u32), Hash32>,
}

impl SlashingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a proposer's microblock hash for `(round, micro_index)`.
    /// Returns evidence if the proposer previously signed a *different*
    /// block for the same slot; idempotent on an identical resubmission.
    pub fn check_and_record(
        &mut self,
        node: Address,
        round: u64,
        micro_index: u32,
        block_hash: Hash32,
    ) -> Option<DoubleSignEvidence> {
        let key = (node, round, micro_index);
        match self.seen.get(&key) {
            Some(existing) if *existing != block_hash => Some(DoubleSignEvidence {
                node,
                round,
                micro_index,
                block_a: *existing,
                block_b: block_hash,
            }),
            Some(_) => None,
            None => {
                self.seen.insert(key, block_hash);
                None
            }
        }
    }

    pub fn prune_before(&mut self, round: u64) {
        self.seen.retain(|(_, r, _), _| *r >= round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_submission_is_never_evidence() {
        let mut ledger = SlashingLedger::new();
        let result = ledger.check_and_record([1u8; 32], 1, 0, [1u8; 32]);
        assert!(result.is_none());
    }

    #[test]
    fn conflicting_block_for_same_slot_is_double_sign() {
        let mut ledger = SlashingLedger::new();
        ledger.check_and_record([1u8; 32], 1, 0, [1u8; 32]);
        let evidence = ledger.check_and_record([1u8; 32], 1, 0, [2u8; 32]);
        assert_eq!(
            evidence,
            Some(DoubleSignEvidence { node: [1u8; 32], round: 1, micro_index: 0, block_a: [1u8; 32], block_b: [2u8; 32] })
        );
    }

    #[test]
    fn identical_resubmission_is_idempotent() {
        let mut ledger = SlashingLedger::new();
        ledger.check_and_record([1u8; 32], 1, 0, [1u8; 32]);
        let result = ledger.check_and_record([1u8; 32], 1, 0, [1u8; 32]);
        assert!(result.is_none());
    }

    #[test]
    fn prune_drops_old_rounds() {
        let mut ledger = SlashingLedger::new();
        ledger.check_and_record([1u8; 32], 1, 0, [1u8; 32]);
        ledger.prune_before(2);
        // round 1 entry pruned; a "conflicting" resubmission at round 1
        // is now treated as first-seen rather than evidence.
        let result = ledger.check_and_record([1u8; 32], 1, 0, [9u8; 32]);
        assert!(result.is_none());
    }
}
