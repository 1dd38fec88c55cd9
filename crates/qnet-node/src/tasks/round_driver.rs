//! T1, the round driver (`spec.md` §4.5, §5): drives the commit window,
//! the reveal window, and the one-microblock-per-second production phase
//! that follows leader election, then seals the macroblock and adjusts
//! difficulty. Never awaits blocking I/O past its own budget; outbound
//! broadcasts use `try_send` so a slow peer can never stall the round.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, warn};

use qnet_consensus::domain::microblock::{validate_microblock, MICROBLOCK_INTERVAL_SECS};
use qnet_consensus::{RoundState, RoundTiming};
use qnet_crypto::envelope::sign;
use qnet_crypto::hashing::block_header_hash;
use qnet_crypto::merkle::merkle_root;
use qnet_mempool::MempoolApi;
use qnet_state::StateStore;
use qnet_types::block::{BlockHeader, Commit, Macroblock, Microblock, Reveal};
use qnet_types::ipc::EgressMessage;
use qnet_types::Hash32;

use qnet_telemetry::{CONSENSUS_ROUNDS, MICROBLOCK_LATENCY_SECONDS, TIMING_VIOLATIONS};

use crate::container::CoreContext;

/// Inbound channels the ingress demux (T2) feeds this task from.
pub struct RoundInbox {
    pub commits: mpsc::Receiver<Commit>,
    pub reveals: mpsc::Receiver<Reveal>,
    pub microblocks: mpsc::Receiver<Microblock>,
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Runs consensus rounds forever. `egress` carries this node's own
/// commits, reveals, microblocks and macroblocks out to the network
/// layer (absent in the reference build; a production deployment wires
/// it to the wire codec).
pub async fn run_round_driver(ctx: Arc<CoreContext>, mut inbox: RoundInbox, egress: mpsc::Sender<EgressMessage>) {
    let timing = RoundTiming {
        t_commit_secs: ctx.config.consensus.t_commit_secs,
        t_reveal_secs: ctx.config.consensus.t_reveal_secs,
    };
    let mut round_number = ctx.state.height();

    loop {
        round_number += 1;
        let mut round = RoundState::new(round_number);
        let round_started = Instant::now();

        // --- commit phase ---------------------------------------------------
        let my_nonce: [u8; 32] = {
            let mut buf = [0u8; 32];
            let digest = qnet_crypto::hashing::hash(
                &[round_number.to_be_bytes().as_slice(), ctx.local_validator.address.as_slice()].concat(),
                qnet_crypto::hashing::HashAlgorithm::Sha256,
            );
            buf.copy_from_slice(&digest);
            buf
        };
        let commitment = qnet_consensus::domain::commit_reveal::commit_hash(my_nonce, round_number, ctx.local_validator.address);
        let my_commit = Commit {
            round: round_number,
            node: ctx.local_validator.address,
            commitment,
            signature: sign(&commitment, &ctx.local_validator.secret_key).map(|s| s.as_bytes().to_vec()).unwrap_or_default(),
        };
        if let Err(err) = round.add_commit(my_commit.clone()) {
            warn!(round = round_number, %err, "local commit rejected");
        }
        let _ = egress.try_send(EgressMessage::BroadcastCommit(my_commit));

        drain_for(Duration::from_secs(timing.t_commit_secs), &mut inbox.commits, |commit| {
            if let Err(err) = round.add_commit(commit) {
                warn!(round = round_number, %err, "peer commit rejected");
            }
        })
        .await;

        // --- reveal phase ----------------------------------------------------
        let my_reveal = Reveal {
            round: round_number,
            node: ctx.local_validator.address,
            nonce: my_nonce,
            signature: sign(&my_nonce, &ctx.local_validator.secret_key).map(|s| s.as_bytes().to_vec()).unwrap_or_default(),
        };
        if let Err(err) = round.add_reveal(my_reveal.clone()) {
            warn!(round = round_number, %err, "local reveal rejected");
        }
        let _ = egress.try_send(EgressMessage::BroadcastReveal(my_reveal));

        drain_for(Duration::from_secs(timing.t_reveal_secs), &mut inbox.reveals, |reveal| {
            if let Err(err) = round.add_reveal(reveal) {
                warn!(round = round_number, %err, "peer reveal rejected");
            }
        })
        .await;

        // --- leader election --------------------------------------------------
        if round.reveal_count() < ctx.config.consensus.minimum_reveals {
            warn!(round = round_number, reveals = round.reveal_count(), "round failed: insufficient reveals");
            CONSENSUS_ROUNDS.with_label_values(&["failure"]).inc();
            for node in round.committed_not_revealed() {
                ctx.consensus
                    .report_consensus_failure(qnet_consensus::domain::identity::node_id_of(node), round_number)
                    .await;
            }
            continue;
        }

        let eligible = ctx.consensus.eligible_addresses();
        let theta = ctx.consensus.theta();
        let leader = match round.elect_leader(&eligible, theta) {
            Ok(leader) => leader,
            Err(err) => {
                warn!(round = round_number, %err, theta, "round failed: leader election");
                CONSENSUS_ROUNDS.with_label_values(&["failure"]).inc();
                continue;
            }
        };
        info!(round = round_number, leader = %hex::encode(leader), "leader elected");

        // --- microblock production phase ---------------------------------------
        let prev_hash = ctx.state.latest_block().map(|b| block_header_hash(&b.header)).unwrap_or([0u8; 32]);
        let microblocks = if leader == ctx.local_validator.address {
            produce_microblocks(&ctx, round_number, leader, prev_hash, &egress).await
        } else {
            collect_microblocks(&ctx, &mut inbox.microblocks, round_number, leader, prev_hash).await
        };

        if microblocks.is_empty() {
            warn!(round = round_number, "round produced no microblocks, skipping macroblock seal");
            CONSENSUS_ROUNDS.with_label_values(&["timeout"]).inc();
            continue;
        }

        let fingerprints: Vec<Hash32> = microblocks
            .iter()
            .flat_map(|m| m.transactions.iter().map(qnet_crypto::hashing::tx_fingerprint))
            .collect();
        let macroblock = Macroblock {
            header: BlockHeader {
                height: ctx.state.height(),
                round: round_number,
                prev_hash,
                microblocks_root: merkle_root(&fingerprints),
                leader,
                timestamp: now_secs(),
            },
            microblocks,
        };

        if leader == ctx.local_validator.address {
            let _ = egress.try_send(EgressMessage::BroadcastMacroblock(macroblock.clone()));
        }

        match ctx.consensus.seal_macroblock(macroblock).await {
            Ok(()) => {
                CONSENSUS_ROUNDS.with_label_values(&["success"]).inc();
            }
            Err(err) => {
                warn!(round = round_number, %err, "failed to seal macroblock");
                CONSENSUS_ROUNDS.with_label_values(&["failure"]).inc();
            }
        }

        let actual_total_secs = round_started.elapsed().as_secs().max(1);
        ctx.consensus.adjust_difficulty(round_number, actual_total_secs);
    }
}

async fn drain_for<T>(budget: Duration, rx: &mut mpsc::Receiver<T>, mut on_item: impl FnMut(T)) {
    let deadline = sleep(budget);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            maybe_item = rx.recv() => {
                match maybe_item {
                    Some(item) => on_item(item),
                    None => break,
                }
            }
        }
    }
}

/// This node is the elected leader: produces one microblock per second
/// for `microblock_phase_secs`, drawing transactions from the mempool.
async fn produce_microblocks(
    ctx: &Arc<CoreContext>,
    round: u64,
    leader: qnet_types::Address,
    genesis_prev_hash: Hash32,
    egress: &mpsc::Sender<EgressMessage>,
) -> Vec<Microblock> {
    let mut microblocks = Vec::new();
    let mut prev_hash = genesis_prev_hash;
    let phase_ticks = ctx.config.consensus.t_commit_secs.min(20).max(1);

    for index in 0..phase_ticks as u32 {
        let tick_started = Instant::now();
        let txs = ctx
            .mempool
            .get_for_inclusion(ctx.config.consensus.max_txs_per_microblock, usize::MAX);
        let fingerprints: Vec<Hash32> = txs.iter().map(qnet_crypto::hashing::tx_fingerprint).collect();
        let tx_merkle_root = merkle_root(&fingerprints);
        let timestamp = now_secs();
        let mut mb = Microblock {
            round,
            index,
            proposer: leader,
            prev_hash,
            transactions: txs,
            tx_merkle_root,
            timestamp,
            signature: Vec::new(),
        };
        mb.signature = sign(&mb.signing_payload(), &ctx.local_validator.secret_key)
            .map(|s| s.as_bytes().to_vec())
            .unwrap_or_default();

        ctx.consensus.observe_microblock(leader, round, index, &mb).await;
        prev_hash = qnet_consensus::domain::microblock::microblock_hash(&mb);
        let _ = egress.try_send(EgressMessage::BroadcastMicroblock(mb.clone()));
        microblocks.push(mb);

        record_microblock_latency(tick_started, ctx.config.consensus.microblock_budget_warn_ms, ctx.config.consensus.microblock_budget_fail_ms);

        sleep(Duration::from_secs(MICROBLOCK_INTERVAL_SECS)).await;
    }
    microblocks
}

/// This node is a follower: validates whatever the leader broadcasts for
/// the same window, in strict index order, and reports invalid blocks.
async fn collect_microblocks(
    ctx: &Arc<CoreContext>,
    rx: &mut mpsc::Receiver<Microblock>,
    round: u64,
    leader: qnet_types::Address,
    genesis_prev_hash: Hash32,
) -> Vec<Microblock> {
    let mut microblocks = Vec::new();
    let mut prev_hash = genesis_prev_hash;
    let mut next_index = 0u32;
    let phase_ticks = ctx.config.consensus.t_commit_secs.min(20).max(1);
    let budget = Duration::from_secs(phase_ticks + 2);
    let deadline = sleep(budget);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            maybe_mb = rx.recv() => {
                let Some(mb) = maybe_mb else { break };
                let tick_started = Instant::now();
                let now = now_secs();
                match validate_microblock(&mb, prev_hash, &leader, next_index, now) {
                    Ok(()) => {
                        ctx.consensus.observe_microblock(leader, round, mb.index, &mb).await;
                        prev_hash = qnet_consensus::domain::microblock::microblock_hash(&mb);
                        next_index += 1;
                        microblocks.push(mb);
                    }
                    Err(err) => {
                        warn!(round, %err, "rejected microblock from elected leader");
                        ctx.consensus
                            .report_invalid_block(qnet_consensus::domain::identity::node_id_of(leader), round)
                            .await;
                    }
                }
                record_microblock_latency(tick_started, ctx.config.consensus.microblock_budget_warn_ms, ctx.config.consensus.microblock_budget_fail_ms);
                if next_index as u64 >= phase_ticks {
                    break;
                }
            }
        }
    }
    microblocks
}

fn record_microblock_latency(started: Instant, warn_ms: u64, fail_ms: u64) {
    let elapsed = started.elapsed();
    MICROBLOCK_LATENCY_SECONDS.observe(elapsed.as_secs_f64());
    if elapsed.as_millis() as u64 >= fail_ms {
        TIMING_VIOLATIONS.inc();
        warn!(elapsed_ms = elapsed.as_millis() as u64, fail_ms, "microblock budget exceeded");
    } else if elapsed.as_millis() as u64 >= warn_ms {
        warn!(elapsed_ms = elapsed.as_millis() as u64, warn_ms, "microblock budget warning");
    }
}
