//! T4, the background sweep task (`spec.md` §4.4, §5): periodically
//! excludes inactive nodes and snapshots the state store on a block-count
//! cadence, both off the round driver's critical path.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::interval;
use tracing::info;

use qnet_state::StateStore;
use qnet_telemetry::{NODES_ACTIVE, NODES_EXCLUDED};

use crate::container::CoreContext;

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

pub async fn run_sweeps(ctx: Arc<CoreContext>) {
    let mut inactivity_tick = interval(Duration::from_secs(ctx.config.lifecycle.inactivity_sweep_interval_secs));
    let mut snapshot_tick = interval(Duration::from_secs(ctx.config.lifecycle.ban_expiry_sweep_interval_secs));
    let mut last_snapshot_height = 0u64;

    loop {
        tokio::select! {
            _ = inactivity_tick.tick() => run_inactivity_pass(&ctx).await,
            _ = snapshot_tick.tick() => run_snapshot_pass(&ctx, &mut last_snapshot_height),
        }
    }
}

async fn run_inactivity_pass(ctx: &Arc<CoreContext>) {
    let excluded = ctx.lifecycle.run_inactivity_sweep(now_secs()).await;
    if !excluded.is_empty() {
        info!(count = excluded.len(), "inactivity sweep excluded nodes");
    }
    NODES_ACTIVE.set(ctx.registry.active_count() as f64);
    NODES_EXCLUDED.set(NODES_EXCLUDED.get() + excluded.len() as f64);
}

fn run_snapshot_pass(ctx: &Arc<CoreContext>, last_snapshot_height: &mut u64) {
    let height = ctx.state.height();
    let interval_blocks = ctx.config.storage.snapshot_interval_blocks.max(1);
    if height == 0 || height / interval_blocks == *last_snapshot_height / interval_blocks {
        return;
    }
    match ctx.state.create_snapshot(height) {
        Ok(_snapshot) => {
            info!(height, "state snapshot created");
            *last_snapshot_height = height;
        }
        Err(err) => tracing::warn!(%err, height, "snapshot creation failed"),
    }
}
