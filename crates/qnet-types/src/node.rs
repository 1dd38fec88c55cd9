use serde::{Deserialize, Serialize};

/// `node_id` is an opaque string derived from a node's public key
/// (`spec.md` §3), not the raw 32-byte address — it is what operators
/// and the registry index on.
pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeTier {
    Light,
    Full,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Active,
    Excluded,
    TemporarilyBanned,
    PermanentlyBanned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusPhase {
    Phase1,
    Phase2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: NodeId,
    pub wallet_address: String,
    pub node_type: NodeTier,
    pub reputation: f64,
    pub last_ping_ts: u64,
    pub total_violations: u32,
    pub accumulated_rewards: u128,
    pub status: NodeStatus,
    pub ban_expiry_ts: Option<u64>,
    pub exclusion_ts: Option<u64>,
    pub violation_history: Vec<ViolationRecord>,
    /// Set by an inactivity violation that drops reputation below the
    /// rewards threshold without yet warranting exclusion; cleared on
    /// restoration or when reputation recovers above the threshold.
    pub reward_suspended: bool,
}

impl NodeRecord {
    pub fn new_active(node_id: NodeId, wallet_address: String, node_type: NodeTier, now: u64) -> Self {
        Self {
            node_id,
            wallet_address,
            node_type,
            reputation: 50.0,
            last_ping_ts: now,
            total_violations: 0,
            accumulated_rewards: 0,
            status: NodeStatus::Active,
            ban_expiry_ts: None,
            exclusion_ts: None,
            violation_history: Vec::new(),
            reward_suspended: false,
        }
    }
}

/// Preserved state of a node that has been moved to `excluded` by the
/// inactivity sweep (`spec.md` §4.4.e). Retained in full so the node can
/// be reinstated without re-activating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedInfo {
    pub excluded_at: u64,
    pub node_type: NodeTier,
    pub wallet: String,
    pub last_reputation: f64,
    pub accumulated_rewards: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Inactivity class.
    MissedPing,
    /// Inactivity class; emitted by the periodic sweep.
    OfflineExtended,
    /// Attack class.
    InvalidBlock,
    /// Attack class.
    ConsensusFailure,
    /// Attack class.
    NetworkSpam,
    /// Attack class.
    DoubleSign,
}

impl ViolationKind {
    pub fn reputation_cost(self) -> f64 {
        match self {
            Self::MissedPing => 1.0,
            Self::OfflineExtended => 15.0,
            Self::InvalidBlock => 5.0,
            Self::ConsensusFailure => 10.0,
            Self::NetworkSpam => 2.0,
            Self::DoubleSign => 30.0,
        }
    }

    pub fn is_inactivity_class(self) -> bool {
        matches!(self, Self::MissedPing | Self::OfflineExtended)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationAction {
    Warning,
    RewardSuspension,
    NetworkExclusion,
    ConsensusBan,
    TemporaryBan,
    PermanentBan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub kind: ViolationKind,
    pub ts: u64,
    pub reputation_cost: f64,
    pub action: ViolationAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub wallet: String,
    pub node_type: NodeTier,
    pub phase: ConsensusPhase,
    pub proof_ref: String,
    pub activation_code: String,
    pub created_ts: u64,
}

/// Per-node, per-4-hour-window ping challenge outcome (`spec.md` §3).
/// The window is 240 one-minute slots; exactly one slot is the node's
/// assigned challenge slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingRecord {
    pub node_id: NodeId,
    pub window_start: u64,
    pub slot: u16,
    pub responded: bool,
    pub latency_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLedgerEntry {
    pub node_id: NodeId,
    pub window: u64,
    pub amount: u128,
    pub claimed: bool,
}
