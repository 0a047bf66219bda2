//! Shared constants for dashboard normalization.

/// Maximum length of a Grafana dashboard UID.
pub const UID_MAX_LEN: usize = 40;

/// Fallback UID when slug derivation produces an empty string.
pub const UID_FALLBACK: &str = "dashboard";

/// Manifest file name, looked up at the dashboards root.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Candidate dashboards roots, tried in order when none is given explicitly.
pub const ROOT_CANDIDATES: &[&str] = &[
  "stacks/monitoring/grafana/dashboards",
  "monitoring/grafana/dashboards",
];

/// Canonical metrics datasource: VictoriaMetrics behind the Prometheus API.
pub const METRICS_DS_TYPE: &str = "prometheus";
pub const METRICS_DS_UID: &str = "DS_PROMETHEUS";
pub const METRICS_DS_NAME: &str = "VictoriaMetrics";

/// UID strings and placeholders that resolve to the metrics backend.
pub const METRICS_DS_ALIASES: &[&str] = &[
  "DS_PROMETHEUS",
  "${DS_PROMETHEUS}",
  "prometheus",
  "victoriametrics",
  "VictoriaMetrics",
];

/// Canonical logs datasource: the VictoriaLogs Grafana plugin.
pub const LOGS_DS_TYPE: &str = "victoriametrics-logs-datasource";
pub const LOGS_DS_UID: &str = "victorialogs";
pub const LOGS_DS_NAME: &str = "VictoriaLogs";

/// UID strings and placeholders that resolve to the logs backend.
pub const LOGS_DS_ALIASES: &[&str] = &["victorialogs", "${DS_VICTORIALOGS}", "VictoriaLogs"];

/// Grafana's built-in annotations datasource. Must never be rewritten.
pub const INTERNAL_DS_TYPE: &str = "grafana";
pub const INTERNAL_DS_UID: &str = "-- Grafana --";

/// Panel type string of the deprecated Angular visualization engine.
pub const DEPRECATED_PANEL_TYPE: &str = "angular";
