use std::env;

/// Telemetry configuration read from environment variables, following the
/// node-wide convention of env-var overrides with sane local defaults.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub otlp_endpoint: String,
    pub log_level: String,
    pub json_logs: bool,
    pub metrics_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "qnet-node".to_string(),
            otlp_endpoint: "http://localhost:4317".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            metrics_port: 9100,
        }
    }
}

impl TelemetryConfig {
    /// - `OTEL_SERVICE_NAME`
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT`
    /// - `QNET_LOG_LEVEL`
    /// - `QNET_JSON_LOGS`
    /// - `QNET_METRICS_PORT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: env::var("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or(defaults.otlp_endpoint),
            log_level: env::var("QNET_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: env::var("QNET_JSON_LOGS").map(|v| v == "1" || v == "true").unwrap_or(defaults.json_logs),
            metrics_port: env::var("QNET_METRICS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.metrics_port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = TelemetryConfig::default();
        assert_eq!(cfg.service_name, "qnet-node");
        assert_eq!(cfg.metrics_port, 9100);
    }
}
