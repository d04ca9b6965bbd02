//! Application bootstrap implementation.
//!
//! `KioskApp` owns the startup sequence: build the API client, seed the
//! shared state with the track roster, spawn the scan daemon, and hand out
//! the state handle and event stream to whatever renders them.
//!
//! # Example
//!
//! ```ignore
//! use trackside::app::{AppConfig, KioskApp};
//! use trackside::frame::ImageSequenceSource;
//!
//! let source = ImageSequenceSource::from_dir(&frames_dir)?;
//! let mut app = KioskApp::start(AppConfig::default(), source)?;
//!
//! let events = app.take_events().unwrap();
//! // ... render from app.state() as events arrive ...
//!
//! app.shutdown().await;
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::api::{HttpScanApi, ScanApi};
use crate::decode::RqrrDecoder;
use crate::frame::FrameSource;
use crate::scanner::{KioskState, ScanDaemon, ScanEvent, SharedKioskState};
use crate::telemetry::{ScannerMetrics, TelemetrySnapshot};
use crate::track::TrackSelector;

/// A running timing station.
///
/// Must be started from within a Tokio runtime; the scan daemon is spawned
/// onto it. Dropping the app without calling [`shutdown`](Self::shutdown)
/// leaves the daemon running until the runtime stops.
pub struct KioskApp {
    state: SharedKioskState,
    metrics: Arc<ScannerMetrics>,
    events_rx: Option<mpsc::Receiver<ScanEvent>>,
    shutdown: CancellationToken,
    daemon_handle: JoinHandle<()>,
}

impl KioskApp {
    /// Start the station against the real HTTP backend.
    pub fn start<S>(config: AppConfig, source: S) -> Result<Self, AppError>
    where
        S: FrameSource + Sync + 'static,
    {
        let api = HttpScanApi::with_timeout(&config.base_url, config.timeout)?;
        Ok(Self::start_with_api(config, source, Arc::new(api)))
    }

    /// Start the station with a caller-supplied API client.
    pub fn start_with_api<S, A>(config: AppConfig, source: S, api: Arc<A>) -> Self
    where
        S: FrameSource + Sync + 'static,
        A: ScanApi + 'static,
    {
        let selector =
            TrackSelector::with_default(config.tracks.clone(), config.default_track_id.as_deref());
        let state = KioskState::shared(selector);
        let metrics = Arc::new(ScannerMetrics::new());

        let (daemon, events_rx) = ScanDaemon::new(
            source,
            RqrrDecoder,
            api,
            config.scanner.clone(),
            Arc::clone(&state),
            Arc::clone(&metrics),
        );

        let shutdown = CancellationToken::new();
        let daemon_handle = tokio::spawn(daemon.run(shutdown.clone()));
        info!(base_url = %config.base_url, "Timing station started");

        Self {
            state,
            metrics,
            events_rx: Some(events_rx),
            shutdown,
            daemon_handle,
        }
    }

    /// Handle to the shared kiosk state.
    pub fn state(&self) -> SharedKioskState {
        Arc::clone(&self.state)
    }

    /// Take the event stream. Returns `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<ScanEvent>> {
        self.events_rx.take()
    }

    /// Current pipeline counters.
    pub fn metrics_snapshot(&self) -> TelemetrySnapshot {
        self.metrics.snapshot()
    }

    /// Stop the scan daemon and wait for it to exit.
    pub async fn shutdown(self) {
        info!("Shutting down timing station");
        self.shutdown.cancel();
        // The daemon never panics in normal operation; a join error here
        // means it was aborted externally, which is fine at shutdown.
        let _ = self.daemon_handle.await;
    }
}
