//! Prometheus metrics for the metrics a production operator actually
//! watches on a QNet node: round health, microblock latency, mempool
//! pressure, and node population by status.

use lazy_static::lazy_static;
use prometheus::{exponential_buckets, Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry};

use crate::TelemetryError;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    /// Consensus rounds by outcome: success/timeout/failure.
    pub static ref CONSENSUS_ROUNDS: CounterVec = CounterVec::new(
        Opts::new("qnet_consensus_rounds_total", "Total consensus rounds by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Microblock create+validate latency, seconds.
    pub static ref MICROBLOCK_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "qnet_consensus_microblock_latency_seconds",
            "Time spent creating and validating a microblock"
        ).buckets(exponential_buckets(0.001, 2.0, 12).unwrap())
    ).expect("metric creation failed");

    pub static ref TIMING_VIOLATIONS: Counter = Counter::new(
        "qnet_consensus_timing_violations_total",
        "Microblock budget overruns"
    ).expect("metric creation failed");

    pub static ref MEMPOOL_SIZE: Gauge = Gauge::new(
        "qnet_mempool_size", "Current number of pending transactions"
    ).expect("metric creation failed");

    pub static ref NODES_ACTIVE: Gauge = Gauge::new(
        "qnet_lifecycle_nodes_active", "Active node count"
    ).expect("metric creation failed");

    pub static ref NODES_EXCLUDED: Gauge = Gauge::new(
        "qnet_lifecycle_nodes_excluded", "Excluded node count"
    ).expect("metric creation failed");

    pub static ref NODES_BANNED: Gauge = Gauge::new(
        "qnet_lifecycle_nodes_banned", "Temporarily or permanently banned node count"
    ).expect("metric creation failed");

    pub static ref REWARD_LEDGER_OUTSTANDING: Gauge = Gauge::new(
        "qnet_lifecycle_reward_ledger_outstanding", "Sum of unclaimed reward ledger entries"
    ).expect("metric creation failed");

    pub static ref SUBSYSTEM_ERRORS: CounterVec = CounterVec::new(
        Opts::new("qnet_subsystem_errors_total", "Internal-class errors by subsystem"),
        &["subsystem"]
    ).expect("metric creation failed");
}

pub struct MetricsHandle;

pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let map_err = |e: prometheus::Error| TelemetryError::MetricsInit(e.to_string());
    REGISTRY.register(Box::new(CONSENSUS_ROUNDS.clone())).map_err(map_err)?;
    REGISTRY.register(Box::new(MICROBLOCK_LATENCY_SECONDS.clone())).map_err(map_err)?;
    REGISTRY.register(Box::new(TIMING_VIOLATIONS.clone())).map_err(map_err)?;
    REGISTRY.register(Box::new(MEMPOOL_SIZE.clone())).map_err(map_err)?;
    REGISTRY.register(Box::new(NODES_ACTIVE.clone())).map_err(map_err)?;
    REGISTRY.register(Box::new(NODES_EXCLUDED.clone())).map_err(map_err)?;
    REGISTRY.register(Box::new(NODES_BANNED.clone())).map_err(map_err)?;
    REGISTRY.register(Box::new(REWARD_LEDGER_OUTSTANDING.clone())).map_err(map_err)?;
    REGISTRY.register(Box::new(SUBSYSTEM_ERRORS.clone())).map_err(map_err)?;
    Ok(MetricsHandle)
}
