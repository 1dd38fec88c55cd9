//! Structured logging and metrics initialization shared by every QNet
//! binary and long-lived task.

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    register_metrics, MetricsHandle, CONSENSUS_ROUNDS, MEMPOOL_SIZE, MICROBLOCK_LATENCY_SECONDS,
    NODES_ACTIVE, NODES_BANNED, NODES_EXCLUDED, REWARD_LEDGER_OUTSTANDING, SUBSYSTEM_ERRORS,
    TIMING_VIOLATIONS,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("failed to initialize tracer: {0}")]
    TracerInit(String),

    #[error("failed to initialize metrics: {0}")]
    MetricsInit(String),
}

pub struct TelemetryHandle {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

/// Initializes tracing (OTLP export plus console/JSON logs) and the
/// Prometheus metrics registry. The returned handle must be held for the
/// process lifetime; dropping it flushes pending spans.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryHandle, TelemetryError> {
    let metrics = register_metrics()?;
    let tracing = tracing_setup::init_tracing(&config).await?;
    Ok(TelemetryHandle { _tracing: tracing, _metrics: metrics })
}
