//! Scan-pipeline telemetry for observability and operator feedback.
//!
//! Lock-free atomic counters record what the scan loop is doing; a
//! point-in-time [`TelemetrySnapshot`] is taken for display.
//!
//! ```text
//! Scan Daemon ────► ScannerMetrics ────► TelemetrySnapshot ────► Views
//!                   (atomic counters)    (point-in-time copy)    (CLI, etc.)
//! ```

mod metrics;
mod snapshot;

pub use metrics::ScannerMetrics;
pub use snapshot::TelemetrySnapshot;
