//! The sync sub-protocol (`spec.md` §4.2), operating purely against the
//! `StateStore` trait so it works over either adapter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use qnet_crypto::hashing::block_header_hash;
use qnet_types::{BlockHeader, Hash32};

use crate::domain::snapshot::SnapshotRef;
use crate::ports::StateStore;

pub type PeerId = String;

#[derive(Debug, Clone)]
pub struct PeerStatus {
    pub verified_height: u64,
    pub is_trusted: bool,
    pub consecutive_failures: u32,
    pub quarantined_until: Option<std::time::Instant>,
}

impl Default for PeerStatus {
    fn default() -> Self {
        Self { verified_height: 0, is_trusted: false, consecutive_failures: 0, quarantined_until: None }
    }
}

pub const QUARANTINE_COOLDOWN: Duration = Duration::from_secs(300);
pub const QUARANTINE_THRESHOLD: u32 = 3;

/// Per-peer retry/quarantine bookkeeping, shared by the fast-sync driver
/// and any other outbound peer-RPC caller per `spec.md` §5's cancellation
/// and timeout policy.
pub struct PeerRegistry {
    peers: HashMap<PeerId, PeerStatus>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self { peers: HashMap::new() }
    }

    pub fn record_success(&mut self, peer: &PeerId, verified_height: u64) {
        let status = self.peers.entry(peer.clone()).or_default();
        status.verified_height = verified_height;
        status.is_trusted = true;
        status.consecutive_failures = 0;
        status.quarantined_until = None;
    }

    pub fn record_failure(&mut self, peer: &PeerId) {
        let status = self.peers.entry(peer.clone()).or_default();
        status.consecutive_failures += 1;
        if status.consecutive_failures >= QUARANTINE_THRESHOLD {
            status.quarantined_until = Some(std::time::Instant::now() + QUARANTINE_COOLDOWN);
        }
    }

    pub fn is_quarantined(&self, peer: &PeerId) -> bool {
        self.peers
            .get(peer)
            .and_then(|s| s.quarantined_until)
            .map(|until| std::time::Instant::now() < until)
            .unwrap_or(false)
    }

    /// Fast-sync peer selection: the largest verified height among
    /// trusted, non-quarantined peers.
    pub fn best_sync_peer(&self) -> Option<(&PeerId, &PeerStatus)> {
        self.peers
            .iter()
            .filter(|(id, status)| status.is_trusted && !self.is_quarantined(id))
            .max_by_key(|(_, status)| status.verified_height)
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Response to `get_headers(start, limit)`.
pub fn get_headers(store: &dyn StateStore, start: u64, limit: u64) -> Vec<BlockHeader> {
    store.iterate_range(start, start + limit).into_iter().map(|b| b.header).collect()
}

/// Response to `get_blocks(start, limit)`.
pub fn get_blocks(store: &dyn StateStore, start: u64, limit: u64) -> Vec<qnet_types::Block> {
    store.iterate_range(start, start + limit)
}

/// Response to `get_snapshot(latest)`.
pub fn get_snapshot(store: &dyn StateStore) -> Option<SnapshotRef> {
    let height = store.height();
    if height == 0 {
        return None;
    }
    store.create_snapshot(height - 1).ok()
}

/// Validates that a header chain is hash-continuous: each header's
/// `prev_hash` equals the hash of the one before it.
pub fn validate_header_continuity(headers: &[BlockHeader]) -> bool {
    headers.windows(2).all(|pair| pair[1].prev_hash == block_header_hash(&pair[0]))
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("no trusted peer available for fast-sync")]
    NoTrustedPeer,

    #[error("snapshot content hash failed verification")]
    SnapshotHashInvalid,

    #[error("snapshot header does not link to the reported tip")]
    SnapshotTipMismatch,
}

/// Fast-sync policy (`spec.md` §4.2): pick the best trusted peer,
/// download its snapshot, verify the file hash, verify the snapshot's
/// latest-block header links to the reported tip, then apply it. Header
/// sync forward and lazy body fetch are the caller's responsibility once
/// this returns.
pub fn fast_sync(
    store: &Arc<dyn StateStore>,
    registry: &PeerRegistry,
    fetch_snapshot: impl FnOnce(&PeerId) -> Option<SnapshotRef>,
    reported_tip_hash: Hash32,
) -> Result<(), SyncError> {
    let (peer, _status) = registry.best_sync_peer().ok_or(SyncError::NoTrustedPeer)?;
    let snapshot = fetch_snapshot(peer).ok_or(SyncError::NoTrustedPeer)?;
    if !snapshot.verify_content_hash() {
        return Err(SyncError::SnapshotHashInvalid);
    }
    if block_header_hash(&snapshot.payload.header) != reported_tip_hash {
        return Err(SyncError::SnapshotTipMismatch);
    }
    store.apply_snapshot(snapshot).map_err(|_| SyncError::SnapshotTipMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarantine_triggers_after_threshold_failures() {
        let mut registry = PeerRegistry::new();
        let peer = "peer-1".to_string();
        for _ in 0..QUARANTINE_THRESHOLD {
            registry.record_failure(&peer);
        }
        assert!(registry.is_quarantined(&peer));
    }

    #[test]
    fn best_sync_peer_picks_highest_verified_height() {
        let mut registry = PeerRegistry::new();
        registry.record_success(&"a".to_string(), 10);
        registry.record_success(&"b".to_string(), 50);
        let (best, _) = registry.best_sync_peer().unwrap();
        assert_eq!(best, "b");
    }

    #[test]
    fn untrusted_peer_is_never_selected() {
        let mut registry = PeerRegistry::new();
        registry.record_failure(&"a".to_string());
        assert!(registry.best_sync_peer().is_none());
    }
}
