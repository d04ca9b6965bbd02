//! Atomic counters for the scan pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

use super::TelemetrySnapshot;

/// Counters recorded by the scan daemon.
///
/// All updates are relaxed atomic increments; the struct is shared as
/// `Arc<ScannerMetrics>` between the daemon and any views.
#[derive(Debug, Default)]
pub struct ScannerMetrics {
    frames_processed: AtomicU64,
    decode_hits: AtomicU64,
    malformed_payloads: AtomicU64,
    dispatches: AtomicU64,
    scans_accepted: AtomicU64,
    scans_rejected: AtomicU64,
    transport_errors: AtomicU64,
}

impl ScannerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame was pulled from the source and cropped for decoding.
    pub fn frame_processed(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// The decoder returned a payload (valid or not).
    pub fn decode_hit(&self) {
        self.decode_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A decoded payload failed the runner-id check.
    pub fn malformed_payload(&self) {
        self.malformed_payloads.fetch_add(1, Ordering::Relaxed);
    }

    /// A well-formed payload was dispatched to the backend.
    pub fn dispatch(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    /// The backend recorded the scan.
    pub fn scan_accepted(&self) {
        self.scans_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// The backend rejected the scan (runner unresolved).
    pub fn scan_rejected(&self) {
        self.scans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// The round-trip failed at the transport or parse level.
    pub fn transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            decode_hits: self.decode_hits.load(Ordering::Relaxed),
            malformed_payloads: self.malformed_payloads.load(Ordering::Relaxed),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            scans_accepted: self.scans_accepted.load(Ordering::Relaxed),
            scans_rejected: self.scans_rejected.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = ScannerMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_processed, 0);
        assert_eq!(snapshot.dispatches, 0);
    }

    #[test]
    fn test_counters_increment() {
        let metrics = ScannerMetrics::new();
        metrics.frame_processed();
        metrics.frame_processed();
        metrics.decode_hit();
        metrics.malformed_payload();
        metrics.dispatch();
        metrics.scan_accepted();
        metrics.scan_rejected();
        metrics.transport_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_processed, 2);
        assert_eq!(snapshot.decode_hits, 1);
        assert_eq!(snapshot.malformed_payloads, 1);
        assert_eq!(snapshot.dispatches, 1);
        assert_eq!(snapshot.scans_accepted, 1);
        assert_eq!(snapshot.scans_rejected, 1);
        assert_eq!(snapshot.transport_errors, 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let metrics = Arc::new(ScannerMetrics::new());
        let mut handles = vec![];
        for _ in 0..4 {
            let metrics = Arc::clone(&metrics);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    metrics.frame_processed();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.snapshot().frames_processed, 400);
    }
}
