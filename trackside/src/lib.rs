//! Trackside - QR-code race-timing kiosk core
//!
//! This library provides the scan-to-lap-metric pipeline for a run-club
//! timing station: continuous frame capture, centered-region QR decoding,
//! duplicate-scan suppression, backend round-trips and a bounded scan
//! history with lap-time/pace display.

pub mod api;
pub mod app;
pub mod config;
pub mod decode;
pub mod frame;
pub mod history;
pub mod laptime;
pub mod logging;
pub mod region;
pub mod scanner;
pub mod telemetry;
pub mod track;

/// Crate version, exposed for CLI banners and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
