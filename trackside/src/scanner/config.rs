//! Scan-loop tuning knobs.

use std::time::Duration;

/// Default side length of the centered scan region, in pixels.
pub const DEFAULT_REGION_SIZE: u32 = 300;

/// Default duplicate-suppression window after a dispatch.
pub const DEFAULT_COOLDOWN_MS: u64 = 2000;

/// Configuration for the scan daemon.
///
/// The flags are orthogonal: a deployment can shrink the region for a
/// close-mounted camera, stop attaching the track for a single-course
/// event, or hide lap metrics for non-timed fun runs, independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Side length of the square scan region cropped from each frame.
    pub region_size: u32,
    /// How long scanning is suppressed after a payload is dispatched.
    pub cooldown: Duration,
    /// Attach the active track id to scan requests.
    pub attach_track: bool,
    /// Append lap time and pace to the success status message.
    pub show_lap_metrics: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            region_size: DEFAULT_REGION_SIZE,
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            attach_track: true,
            show_lap_metrics: true,
        }
    }
}

impl ScannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan-region side length.
    pub fn with_region_size(mut self, size: u32) -> Self {
        self.region_size = size;
        self
    }

    /// Set the post-dispatch cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Control whether scan requests carry the active track id.
    pub fn with_attach_track(mut self, attach: bool) -> Self {
        self.attach_track = attach;
        self
    }

    /// Control whether success messages include lap time and pace.
    pub fn with_show_lap_metrics(mut self, show: bool) -> Self {
        self.show_lap_metrics = show;
        self
    }
}
