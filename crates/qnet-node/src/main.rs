//! QNet node binary: loads configuration, wires the composition root,
//! spawns the five long-lived tasks, and waits for a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::info;

use qnet_node::config::NodeConfig;
use qnet_node::container::CoreContext;
use qnet_node::tasks::admission::run_admission_worker;
use qnet_node::tasks::ingress::{run_ingress_demux, IngressSinks};
use qnet_node::tasks::round_driver::{run_round_driver, RoundInbox};
use qnet_node::tasks::sweeps::run_sweeps;
use qnet_node::tasks::sync_fetch::{run_sync_fetch, NullPeerClient};
use qnet_state::sync::PeerRegistry;
use qnet_state::StateStore;
use qnet_telemetry::TelemetryConfig;

const CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _telemetry = qnet_telemetry::init_telemetry(TelemetryConfig::from_env()).await?;

    let config_path = std::env::var("QNET_CONFIG_PATH").map(PathBuf::from).ok();
    let config = match config_path {
        Some(path) => NodeConfig::load(&path)?,
        None => NodeConfig::default(),
    };
    info!(data_dir = %config.storage.data_dir.display(), "starting qnet-node");

    let ctx = Arc::new(CoreContext::new(config));
    info!(node_id = %ctx.local_validator.node_id, height = ctx.state.height(), "core ready");

    let (commit_tx, commit_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (reveal_tx, reveal_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (microblock_tx, microblock_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (tx_tx, tx_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (egress_tx, mut egress_rx) = mpsc::channel(CHANNEL_CAPACITY);
    // A real deployment hands this to the wire transport; until then it
    // is kept alive so the demux doesn't see a closed channel.
    let (_peer_ingress_tx, peer_ingress_rx) = mpsc::channel::<(String, qnet_types::ipc::IngressMessage)>(CHANNEL_CAPACITY);

    let round_driver = tokio::spawn(run_round_driver(
        ctx.clone(),
        RoundInbox { commits: commit_rx, reveals: reveal_rx, microblocks: microblock_rx },
        egress_tx,
    ));

    let ingress_demux = tokio::spawn(run_ingress_demux(
        ctx.clone(),
        peer_ingress_rx,
        IngressSinks { transactions: tx_tx, commits: commit_tx, reveals: reveal_tx, microblocks: microblock_tx },
    ));

    let admission_worker = tokio::spawn(run_admission_worker(ctx.clone(), tx_rx));
    let sweeps = tokio::spawn(run_sweeps(ctx.clone()));
    let sync_fetch = tokio::spawn(run_sync_fetch(
        ctx.clone(),
        Arc::new(Mutex::new(PeerRegistry::new())),
        Arc::new(NullPeerClient),
        Vec::new(),
    ));

    let egress_drain = tokio::spawn(async move {
        while let Some(message) = egress_rx.recv().await {
            tracing::debug!(?message, "egress message dropped, no transport configured");
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
        result = round_driver => {
            tracing::error!(?result, "round driver exited unexpectedly");
        }
    }

    ingress_demux.abort();
    admission_worker.abort();
    sweeps.abort();
    sync_fetch.abort();
    egress_drain.abort();

    Ok(())
}
