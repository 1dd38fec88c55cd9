//! Ingress/egress message shapes and the peer-frame version negotiation
//! rule from `spec.md` §6. These are plain data types: the actual wire
//! transport is an out-of-scope collaborator.

use serde::{Deserialize, Serialize};

use crate::block::{Commit, Macroblock, Microblock, Reveal};
use crate::node::NodeId;
use crate::transaction::Transaction;
use crate::Hash32;

pub const SUPPORTED_VERSIONS: &[u32] = &[1];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerFrame {
    pub version: u32,
    pub frame_type: String,
    pub payload: Vec<u8>,
    pub peer_sig: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegotiationOutcome {
    Accepted,
    Rejected { supported: Vec<u32> },
}

/// Pure version-gate: `spec.md` §6 requires unknown versions rejected
/// with a listing of what this node supports, never a silent drop.
pub fn negotiate_version(requested: u32) -> NegotiationOutcome {
    if SUPPORTED_VERSIONS.contains(&requested) {
        NegotiationOutcome::Accepted
    } else {
        NegotiationOutcome::Rejected { supported: SUPPORTED_VERSIONS.to_vec() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTransactionResult {
    pub accepted: bool,
    pub fingerprint: Option<Hash32>,
    pub reject_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResult {
    pub recorded: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawResult {
    pub amount_withdrawn: u128,
    pub tx_hash: Hash32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncKind {
    Headers,
    Bodies,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSyncDataRequest {
    pub kind: SyncKind,
    pub cursor: u64,
}

/// Internal bus message from C5 (consensus) to C4 (lifecycle) reporting
/// a detected violation so the engine can apply the penalty table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationEmitted {
    pub node_id: NodeId,
    pub violation_type: String,
    pub severity: String,
}

/// Internal bus message from C5 to C4 reporting a successful ping-window
/// accrual for an eligible node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccrued {
    pub node_id: NodeId,
    pub window: u64,
    pub amount: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateRequest {
    pub wallet: String,
    pub node_type: crate::node::NodeTier,
    pub phase: crate::node::ConsensusPhase,
    pub proof_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingRequest {
    pub node_id: NodeId,
    pub challenge_response: Vec<u8>,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRewardsRequest {
    pub node_id: NodeId,
    pub wallet_sig: Vec<u8>,
}

/// Every shape the core accepts from the (out-of-scope) network/API
/// layer, `spec.md` §6's ingress list. The wire transport decodes a
/// `PeerFrame`/request body into one of these before handing it to the
/// per-peer ingress demux; this crate never sees the framing itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IngressMessage {
    SubmitTransaction(Transaction),
    Activate(ActivateRequest),
    Ping(PingRequest),
    WithdrawRewards(WithdrawRewardsRequest),
    GetSyncData(GetSyncDataRequest),
    SubmitCommit(Commit),
    SubmitReveal(Reveal),
    SubmitMicroblock(Microblock),
    SubmitMacroblock(Macroblock),
}

/// Every shape the core emits toward the (out-of-scope) network layer,
/// `spec.md` §6's egress list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EgressMessage {
    BroadcastMicroblock(Microblock),
    BroadcastMacroblock(Macroblock),
    BroadcastCommit(Commit),
    BroadcastReveal(Reveal),
}

#[cfg(test)]
mod ingress_tests {
    use super::*;

    #[test]
    fn unknown_version_is_rejected_with_supported_list() {
        let outcome = negotiate_version(99);
        assert_eq!(outcome, NegotiationOutcome::Rejected { supported: SUPPORTED_VERSIONS.to_vec() });
    }

    #[test]
    fn supported_version_is_accepted() {
        assert_eq!(negotiate_version(1), NegotiationOutcome::Accepted);
    }
}
