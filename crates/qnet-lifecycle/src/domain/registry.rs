//! Central node registry (`spec.md` §4.4): activation, ping bookkeeping,
//! violation escalation, the inactivity sweep, restoration, and the
//! reward ledger. `spec.md` §5 serializes updates to node state per
//! node: each `active` entry is its own `parking_lot::Mutex`, while the
//! map structures (`active`, `wallet_to_node`, `excluded`) sit behind a
//! single coarser `RwLock` that is only held for the insert/remove path
//! and for locating a node's per-record lock, never across a node's own
//! mutation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use qnet_types::node::{
    ActivationRecord, ConsensusPhase, ExcludedInfo, NodeId, NodeRecord, NodeStatus, NodeTier,
    RewardLedgerEntry, ViolationAction, ViolationKind, ViolationRecord,
};

use crate::domain::errors::LifecycleError;
use crate::domain::pricing::{ChainMetadata, EconomicPhase, TransitionState};
use crate::ports::ProofOracle;

pub const REWARD_ELIGIBLE_REPUTATION: f64 = 40.0;
pub const CONSENSUS_ELIGIBLE_REPUTATION: f64 = 70.0;
pub const EXCLUSION_REPUTATION_THRESHOLD: f64 = 10.0;
pub const LOW_REPUTATION_BAN_THRESHOLD: f64 = 10.0;
pub const PERMANENT_BAN_VIOLATION_THRESHOLD: u32 = 3;

pub const INACTIVITY_THRESHOLD_SECS: u64 = 7 * 86_400;
pub const CONSENSUS_BAN_SECS: u64 = 24 * 3_600;
pub const TEMPORARY_BAN_SECS: u64 = 7 * 86_400;
pub const PERMANENT_BAN_SENTINEL_SECS: u64 = 100 * 365 * 86_400;

fn free_restoration_window_secs(node_type: NodeTier) -> u64 {
    match node_type {
        NodeTier::Light => 365 * 86_400,
        NodeTier::Full => 90 * 86_400,
        NodeTier::Super => 30 * 86_400,
    }
}

struct LogEntry {
    node_id: NodeId,
    record: ViolationRecord,
}

type NodeSlot = Arc<Mutex<NodeRecord>>;

struct Inner {
    active: HashMap<NodeId, NodeSlot>,
    wallet_to_node: HashMap<String, NodeId>,
    excluded: HashMap<NodeId, ExcludedInfo>,
    violations_log: Vec<LogEntry>,
    consumed_proofs: HashSet<String>,
    reward_ledger: Vec<RewardLedgerEntry>,
    chain: ChainMetadata,
    transition: TransitionState,
    last_phase2_price: Option<u64>,
}

pub struct NodeRegistry {
    inner: RwLock<Inner>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                active: HashMap::new(),
                wallet_to_node: HashMap::new(),
                excluded: HashMap::new(),
                violations_log: Vec::new(),
                consumed_proofs: HashSet::new(),
                reward_ledger: Vec::new(),
                chain: ChainMetadata::default(),
                transition: TransitionState::default(),
                last_phase2_price: None,
            }),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.inner.read().active.len() as u64
    }

    pub fn get(&self, node_id: &str) -> Option<NodeRecord> {
        let slot = self.inner.read().active.get(node_id).cloned()?;
        let record = slot.lock().clone();
        Some(record)
    }

    pub fn get_excluded(&self, node_id: &str) -> Option<ExcludedInfo> {
        self.inner.read().excluded.get(node_id).cloned()
    }

    /// Cumulative Phase-1 burn total and genesis facts, fed into
    /// `domain::pricing::phase1_price` by callers computing the next
    /// activation price.
    pub fn chain_metadata(&self) -> ChainMetadata {
        self.inner.read().chain
    }

    /// Which economic phase is active and, once Phase 2 has begun, when
    /// — fed into `domain::pricing::transition::protected_price` to
    /// smooth the Phase-1→Phase-2 price boundary.
    pub fn transition_state(&self) -> TransitionState {
        self.inner.read().transition
    }

    /// The last Phase-2 activation price charged, the `previous_price`
    /// input `transition::protected_price` smooths away from.
    pub fn last_phase2_price(&self) -> Option<u64> {
        self.inner.read().last_phase2_price
    }

    /// `spec.md` §4.4.a/b, the 5-step registration flow. `required_amount`
    /// is computed by the caller from `domain::pricing` — burn totals and
    /// live network size are chain-level facts this registry doesn't own.
    #[allow(clippy::too_many_arguments)]
    pub fn activate(
        &self,
        node_id: NodeId,
        wallet: String,
        node_type: NodeTier,
        phase: ConsensusPhase,
        proof_ref: String,
        required_amount: u64,
        oracle: &dyn ProofOracle,
        now: u64,
    ) -> Result<ActivationRecord, LifecycleError> {
        let mut inner = self.inner.write();

        if inner.consumed_proofs.contains(&proof_ref) {
            return Err(LifecycleError::Conflict);
        }
        if inner.wallet_to_node.contains_key(&wallet) {
            return Err(LifecycleError::DuplicateWallet);
        }

        let verified = match phase {
            ConsensusPhase::Phase1 => oracle.verify_phase1_burn(&proof_ref, required_amount),
            ConsensusPhase::Phase2 => oracle.verify_phase2_transfer(&proof_ref, required_amount),
        };
        if !verified {
            return Err(LifecycleError::Validation(format!(
                "proof {proof_ref} did not verify for {required_amount}"
            )));
        }

        inner.consumed_proofs.insert(proof_ref.clone());

        let activation_code = qnet_crypto::activation_code(&wallet, &proof_ref, now);
        let record = NodeRecord::new_active(node_id.clone(), wallet.clone(), node_type, now);
        inner.active.insert(node_id.clone(), Arc::new(Mutex::new(record)));
        inner.wallet_to_node.insert(wallet.clone(), node_id.clone());

        match phase {
            ConsensusPhase::Phase1 => inner.chain.total_burned_phase1 += required_amount as u128,
            ConsensusPhase::Phase2 => {
                if inner.transition.phase == EconomicPhase::Phase1 {
                    inner.transition.phase = EconomicPhase::Phase2;
                    inner.transition.phase2_activated_at = Some(now);
                }
                inner.last_phase2_price = Some(required_amount);
            }
        }

        Ok(ActivationRecord {
            wallet,
            node_type,
            phase,
            proof_ref,
            activation_code,
            created_ts: now,
        })
    }

    pub fn record_ping_response(&self, node_id: &str, now: u64) -> Result<(), LifecycleError> {
        let slot = self
            .inner
            .read()
            .active
            .get(node_id)
            .cloned()
            .ok_or_else(|| LifecycleError::NotFound(node_id.to_string()))?;
        slot.lock().last_ping_ts = now;
        Ok(())
    }

    /// `spec.md` §4.4.d. Decrements reputation by the violation's fixed
    /// cost, then escalates per the inactivity/attack ladder. Only
    /// applies to nodes currently `Active` — excluded nodes already left
    /// the eligible set, and bans stack their own escalation instead.
    /// The node's own record lock serializes concurrent violations
    /// against it; the coarse registry lock is only taken afterward, and
    /// only when the outcome requires a structural change (exclusion) or
    /// to append the shared violations log.
    pub fn apply_violation(
        &self,
        node_id: &str,
        kind: ViolationKind,
        now: u64,
    ) -> Result<ViolationRecord, LifecycleError> {
        let slot = self
            .inner
            .read()
            .active
            .get(node_id)
            .cloned()
            .ok_or_else(|| LifecycleError::NotFound(node_id.to_string()))?;

        let (record, excluded_info) = {
            let mut node = slot.lock();

            let cost = kind.reputation_cost();
            node.reputation = (node.reputation - cost).max(0.0);
            node.total_violations += 1;

            let action = if kind.is_inactivity_class() {
                if node.reputation <= EXCLUSION_REPUTATION_THRESHOLD {
                    ViolationAction::NetworkExclusion
                } else if node.reputation < REWARD_ELIGIBLE_REPUTATION {
                    node.reward_suspended = true;
                    ViolationAction::RewardSuspension
                } else {
                    ViolationAction::Warning
                }
            } else if node.total_violations >= PERMANENT_BAN_VIOLATION_THRESHOLD {
                node.reputation = 0.0;
                node.status = NodeStatus::PermanentlyBanned;
                node.ban_expiry_ts = Some(now + PERMANENT_BAN_SENTINEL_SECS);
                ViolationAction::PermanentBan
            } else if node.reputation <= LOW_REPUTATION_BAN_THRESHOLD {
                node.status = NodeStatus::TemporarilyBanned;
                node.ban_expiry_ts = Some(now + TEMPORARY_BAN_SECS);
                ViolationAction::TemporaryBan
            } else {
                node.status = NodeStatus::TemporarilyBanned;
                node.ban_expiry_ts = Some(now + CONSENSUS_BAN_SECS);
                ViolationAction::ConsensusBan
            };

            let record = ViolationRecord {
                kind,
                ts: now,
                reputation_cost: cost,
                action,
            };
            node.violation_history.push(record.clone());

            let excluded_info = (action == ViolationAction::NetworkExclusion).then(|| ExcludedInfo {
                excluded_at: now,
                node_type: node.node_type,
                wallet: node.wallet_address.clone(),
                last_reputation: node.reputation,
                accumulated_rewards: node.accumulated_rewards,
            });

            (record, excluded_info)
        };

        let mut inner = self.inner.write();
        if let Some(excluded) = excluded_info {
            inner.excluded.insert(node_id.to_string(), excluded);
            inner.active.remove(node_id);
        }
        inner.violations_log.push(LogEntry {
            node_id: node_id.to_string(),
            record: record.clone(),
        });

        Ok(record)
    }

    /// `spec.md` §4.4.e. Nodes silent for longer than the inactivity
    /// threshold take an `OfflineExtended` violation and are moved to
    /// `excluded` unconditionally, regardless of whether that violation's
    /// own reputation-driven action already crossed the exclusion
    /// threshold. Returns the ids of nodes this sweep excluded.
    pub fn sweep_inactivity(&self, now: u64) -> Vec<NodeId> {
        let stale: Vec<NodeId> = {
            let inner = self.inner.read();
            inner
                .active
                .iter()
                .filter(|(_, slot)| {
                    let node = slot.lock();
                    node.status == NodeStatus::Active
                        && now.saturating_sub(node.last_ping_ts) > INACTIVITY_THRESHOLD_SECS
                })
                .map(|(id, _)| id.clone())
                .collect()
        };

        let mut excluded_ids = Vec::new();
        for node_id in stale {
            let already_excluded = matches!(
                self.apply_violation(&node_id, ViolationKind::OfflineExtended, now),
                Ok(record) if record.action == ViolationAction::NetworkExclusion
            );
            if already_excluded || self.force_exclude(&node_id, now) {
                excluded_ids.push(node_id);
            }
        }
        excluded_ids
    }

    /// Moves a still-active node straight to `excluded`, independent of
    /// `apply_violation`'s action ladder. No-op (returns `false`) if the
    /// node already left `active` by some other path.
    fn force_exclude(&self, node_id: &str, now: u64) -> bool {
        let slot = match self.inner.read().active.get(node_id).cloned() {
            Some(slot) => slot,
            None => return false,
        };
        let snapshot = {
            let node = slot.lock();
            ExcludedInfo {
                excluded_at: now,
                node_type: node.node_type,
                wallet: node.wallet_address.clone(),
                last_reputation: node.reputation,
                accumulated_rewards: node.accumulated_rewards,
            }
        };

        let mut inner = self.inner.write();
        if !inner.active.contains_key(node_id) {
            return false;
        }
        inner.excluded.insert(node_id.to_string(), snapshot);
        inner.active.remove(node_id);
        true
    }

    /// `spec.md` §4.4.f. Within the node type's free restoration window a
    /// bare call reinstates the node; beyond it a verified proof of
    /// payment is required. Reputation is restored via
    /// `max(25, last_reputation * (1 - penalty_factor))` where
    /// `penalty_factor = min(0.8, (absence / window) * 0.5)`.
    pub fn restore(
        &self,
        node_id: &str,
        proof: Option<(&str, u64, &dyn ProofOracle)>,
        now: u64,
    ) -> Result<(), LifecycleError> {
        let mut inner = self.inner.write();
        let info = inner
            .excluded
            .get(node_id)
            .cloned()
            .ok_or_else(|| LifecycleError::NotFound(node_id.to_string()))?;

        let window = free_restoration_window_secs(info.node_type);
        let absence = now.saturating_sub(info.excluded_at);

        if absence > window {
            let (proof_ref, required_amount, oracle) =
                proof.ok_or(LifecycleError::RestorationWindowExpired)?;
            if inner.consumed_proofs.contains(proof_ref) {
                return Err(LifecycleError::Conflict);
            }
            if !oracle.verify_phase2_transfer(proof_ref, required_amount) {
                return Err(LifecycleError::Validation(format!(
                    "restoration proof {proof_ref} did not verify"
                )));
            }
            inner.consumed_proofs.insert(proof_ref.to_string());
        }

        let penalty_factor = (absence as f64 / window as f64 * 0.5).min(0.8);
        let new_reputation = (info.last_reputation * (1.0 - penalty_factor)).max(25.0);

        let mut record = NodeRecord::new_active(
            node_id.to_string(),
            info.wallet.clone(),
            info.node_type,
            now,
        );
        record.reputation = new_reputation;
        record.accumulated_rewards = info.accumulated_rewards;

        inner.excluded.remove(node_id);
        inner.active.insert(node_id.to_string(), Arc::new(Mutex::new(record)));
        inner.wallet_to_node.insert(info.wallet, node_id.to_string());

        Ok(())
    }

    /// `spec.md` §4.4.g: rewards remain withdrawable regardless of the
    /// node's current status, including while banned or excluded.
    pub fn withdraw_rewards(&self, node_id: &str) -> Result<u128, LifecycleError> {
        let slot = self.inner.read().active.get(node_id).cloned();
        if let Some(slot) = slot {
            let mut node = slot.lock();
            let amount = node.accumulated_rewards;
            node.accumulated_rewards = 0;
            return Ok(amount);
        }
        let mut inner = self.inner.write();
        if let Some(info) = inner.excluded.get_mut(node_id) {
            let amount = info.accumulated_rewards;
            info.accumulated_rewards = 0;
            return Ok(amount);
        }
        Err(LifecycleError::NotFound(node_id.to_string()))
    }

    /// Credits a completed ping-window reward, gated on reward
    /// eligibility (`spec.md` §4.4.c): active, reputation ≥ 40, and not
    /// under an active reward suspension.
    pub fn accrue_reward(
        &self,
        node_id: &str,
        window: u64,
        amount: u128,
    ) -> Result<(), LifecycleError> {
        let slot = self
            .inner
            .read()
            .active
            .get(node_id)
            .cloned()
            .ok_or_else(|| LifecycleError::NotFound(node_id.to_string()))?;

        {
            let mut node = slot.lock();
            if !is_reward_eligible(&node) {
                return Err(LifecycleError::NotEligible(node_id.to_string()));
            }
            node.accumulated_rewards += amount;
        }

        self.inner.write().reward_ledger.push(RewardLedgerEntry {
            node_id: node_id.to_string(),
            window,
            amount,
            claimed: false,
        });
        Ok(())
    }

    pub fn is_consensus_eligible(&self, node_id: &str) -> bool {
        let slot = self.inner.read().active.get(node_id).cloned();
        slot.map(|slot| is_consensus_eligible(&slot.lock())).unwrap_or(false)
    }
}

pub fn is_reward_eligible(node: &NodeRecord) -> bool {
    node.status == NodeStatus::Active
        && node.reputation >= REWARD_ELIGIBLE_REPUTATION
        && !node.reward_suspended
}

pub fn is_consensus_eligible(node: &NodeRecord) -> bool {
    node.status == NodeStatus::Active && node.reputation >= CONSENSUS_ELIGIBLE_REPUTATION
}
