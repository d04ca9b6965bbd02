//! Point-in-time view of the scan-pipeline counters.

use std::fmt;

/// A copy of all pipeline counters, safe to hold across renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Frames pulled from the source and cropped.
    pub frames_processed: u64,
    /// Ticks where the decoder returned a payload.
    pub decode_hits: u64,
    /// Payloads that failed the runner-id check.
    pub malformed_payloads: u64,
    /// Requests dispatched to the backend.
    pub dispatches: u64,
    /// Scans the backend recorded.
    pub scans_accepted: u64,
    /// Scans the backend rejected.
    pub scans_rejected: u64,
    /// Transport or parse failures.
    pub transport_errors: u64,
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames={} hits={} malformed={} dispatched={} accepted={} rejected={} errors={}",
            self.frames_processed,
            self.decode_hits,
            self.malformed_payloads,
            self.dispatches,
            self.scans_accepted,
            self.scans_rejected,
            self.transport_errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_contains_all_counters() {
        let snapshot = TelemetrySnapshot {
            frames_processed: 10,
            decode_hits: 3,
            malformed_payloads: 1,
            dispatches: 2,
            scans_accepted: 1,
            scans_rejected: 1,
            transport_errors: 0,
        };
        let rendered = snapshot.to_string();
        assert!(rendered.contains("frames=10"));
        assert!(rendered.contains("accepted=1"));
    }
}
