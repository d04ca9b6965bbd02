//! The scan daemon: drives frames through decode, validation, dispatch and
//! cooldown.
//!
//! The loop is strictly sequential. One frame is processed at a time, one
//! request is in flight at a time, and the cooldown between dispatches is
//! measured from the moment the request leaves, so a slow server never
//! shortens the duplicate-suppression window.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::{ScanApi, ScanOutcome, ScanRequest};
use crate::decode::{Quad, QrDecoder};
use crate::frame::{CameraError, Frame, FrameSource};
use crate::history::HistoryEntry;
use crate::laptime::{format_lap_time, format_pace};
use crate::region::ScanRegion;
use crate::telemetry::ScannerMetrics;

use super::config::ScannerConfig;
use super::state::{ScanState, SharedKioskState};
use super::status::StatusMessage;
use super::validate::is_runner_id;

/// Capacity of the event channel to views.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notifications pushed to views as the daemon works.
///
/// Events are hints to re-render; the authoritative state lives in
/// [`super::KioskState`]. A view that misses an event (full channel) still
/// converges on its next read of the shared state.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// The status message changed.
    Status(StatusMessage),
    /// A code was detected at this frame-coordinate geometry.
    Outline(Quad),
    /// The scan history gained an entry.
    HistoryUpdated,
}

/// The scan loop, generic over its frame source, decoder, and API client.
pub struct ScanDaemon<S, D, A> {
    source: S,
    decoder: D,
    api: Arc<A>,
    config: ScannerConfig,
    state: SharedKioskState,
    metrics: Arc<ScannerMetrics>,
    events: mpsc::Sender<ScanEvent>,
}

impl<S, D, A> ScanDaemon<S, D, A>
where
    S: FrameSource,
    D: QrDecoder,
    A: ScanApi,
{
    /// Create a daemon along with the receiving half of its event channel.
    pub fn new(
        source: S,
        decoder: D,
        api: Arc<A>,
        config: ScannerConfig,
        state: SharedKioskState,
        metrics: Arc<ScannerMetrics>,
    ) -> (Self, mpsc::Receiver<ScanEvent>) {
        let (events, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (
            Self {
                source,
                decoder,
                api,
                config,
                state,
                metrics,
                events,
            },
            events_rx,
        )
    }

    /// Run the scan loop until the camera fails or shutdown is requested.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            region_size = self.config.region_size,
            cooldown_ms = self.config.cooldown.as_millis() as u64,
            "Scan daemon started"
        );
        self.set_scan_state(ScanState::Scanning);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Scan daemon shutting down");
                    break;
                }

                frame = self.source.next_frame() => {
                    match frame {
                        Ok(frame) => {
                            if let Some(deadline) = self.process_frame(frame).await {
                                self.set_scan_state(ScanState::Cooldown);
                                tokio::select! {
                                    biased;
                                    _ = shutdown.cancelled() => {
                                        info!("Scan daemon shutting down");
                                        break;
                                    }
                                    _ = tokio::time::sleep_until(deadline) => {}
                                }
                                self.set_scan_state(ScanState::Scanning);
                            }
                        }
                        Err(e) => {
                            self.handle_camera_failure(e).await;
                            break;
                        }
                    }
                }
            }
        }

        self.set_scan_state(ScanState::Idle);
    }

    /// Process one frame. Returns the cooldown deadline when a payload was
    /// dispatched, `None` when scanning should continue immediately.
    async fn process_frame(&mut self, frame: Frame) -> Option<tokio::time::Instant> {
        self.metrics.frame_processed();

        let region = ScanRegion::centered(frame.width(), frame.height(), self.config.region_size);
        let pixels = region.extract(&frame);
        let payload = self
            .decoder
            .decode(&pixels, region.width, region.height)?;
        self.metrics.decode_hit();

        // The outline goes out before validation: the operator should see
        // that a code was found even when its payload is garbage.
        let quad = region.to_frame_coords(payload.quad);
        self.send_event(ScanEvent::Outline(quad)).await;

        if !is_runner_id(&payload.text) {
            self.metrics.malformed_payload();
            warn!(payload = %payload.text, "Discarding non-runner payload");
            self.set_status(StatusMessage::warning("Not a valid runner ID"))
                .await;
            // No cooldown: the next frame may hold a real badge.
            return None;
        }

        Some(self.dispatch(payload.text).await)
    }

    /// Submit a validated runner id and apply the outcome.
    ///
    /// The cooldown deadline is fixed here, before the request is sent, so
    /// server latency counts against the window rather than extending it.
    async fn dispatch(&mut self, code: String) -> tokio::time::Instant {
        let deadline = tokio::time::Instant::now() + self.config.cooldown;
        self.metrics.dispatch();
        self.set_scan_state(ScanState::AwaitingServer);
        self.set_status(StatusMessage::info("Processing...")).await;

        let track = if self.config.attach_track {
            self.state.lock().unwrap().tracks.active().cloned()
        } else {
            None
        };
        let request = ScanRequest {
            code,
            track_id: track.as_ref().map(|t| t.id.clone()),
        };

        match self.api.submit(request).await {
            Ok(outcome) => self.apply_outcome(outcome).await,
            Err(e) => {
                self.metrics.transport_error();
                error!(error = %e, "Scan submission failed");
                self.set_status(StatusMessage::error(format!("Scan failed: {}", e)))
                    .await;
            }
        }

        deadline
    }

    async fn apply_outcome(&mut self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Accepted {
                message,
                registration,
                scan_record,
                lap_time,
                pace,
            } => {
                self.metrics.scan_accepted();
                debug!(scan_id = %scan_record.id, runner = %registration.full_name(), "Scan recorded");

                let mut text = message;
                if self.config.show_lap_metrics {
                    if let Some(lap) = lap_time {
                        text.push_str(&format!(" | Lap time: {}", format_lap_time(lap)));
                    }
                    if let Some(p) = pace {
                        text.push_str(&format!(" | Pace: {}", format_pace(p)));
                    }
                }

                let entry = HistoryEntry {
                    id: scan_record.id,
                    student_name: registration.full_name(),
                    grade: registration.grade,
                    teacher: registration.teacher,
                    season_name: scan_record.season.map(|s| s.name),
                    track_name: scan_record.track.as_ref().map(|t| t.name.clone()),
                    track_distance_miles: scan_record.track.as_ref().and_then(|t| t.distance_miles),
                    scanned_at: Local::now(),
                    lap_time,
                    pace,
                };
                self.state.lock().unwrap().history.push(entry);
                self.send_event(ScanEvent::HistoryUpdated).await;
                self.set_status(StatusMessage::success(text)).await;
            }
            ScanOutcome::Rejected { message } => {
                self.metrics.scan_rejected();
                warn!(%message, "Scan rejected");
                // Server wording is shown verbatim
                self.set_status(StatusMessage::warning(message)).await;
            }
        }
    }

    /// A camera failure is terminal: surface it persistently and stop.
    /// Recovery requires an operator restart, never an automatic retry.
    async fn handle_camera_failure(&mut self, error: CameraError) {
        error!(error = %error, "Frame source failed, stopping scan loop");
        let text = match &error {
            CameraError::Unavailable(_) => format!("Camera unavailable: {}", error),
            CameraError::StreamLost => "Camera stream lost".to_string(),
        };
        self.set_status(StatusMessage::error(text).persistent()).await;
    }

    fn set_scan_state(&self, scan_state: ScanState) {
        self.state.lock().unwrap().scan_state = scan_state;
    }

    async fn set_status(&self, status: StatusMessage) {
        let applied = self.state.lock().unwrap().set_status(status.clone());
        if applied {
            self.send_event(ScanEvent::Status(status)).await;
        }
    }

    async fn send_event(&self, event: ScanEvent) {
        // Views are advisory; a full channel drops the event rather than
        // stalling the scan loop.
        if let Err(e) = self.events.try_send(event) {
            debug!(error = %e, "Dropping scan event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::api::tests::MockScanApi;
    use crate::api::{ApiError, Registration, ScanRecordInfo, SeasonInfo, TrackInfo};
    use crate::decode::{DecodedPayload, Point};
    use crate::scanner::{KioskState, StatusLevel};
    use crate::track::{Track, TrackSelector};

    const RUNNER_ID: &str = "a1b2c3d4-e5f6-7890-abcd-ef1234567890";

    /// Frame source that plays back a fixed script, then hangs forever so
    /// the daemon idles instead of treating exhaustion as a camera failure.
    struct ScriptedFrameSource {
        script: Mutex<VecDeque<Result<Frame, CameraError>>>,
    }

    impl ScriptedFrameSource {
        fn new(script: Vec<Result<Frame, CameraError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }

        fn frames(count: usize) -> Self {
            Self::new((0..count).map(|_| Ok(blank_frame())).collect())
        }
    }

    impl FrameSource for ScriptedFrameSource {
        fn next_frame(
            &mut self,
        ) -> Pin<Box<dyn Future<Output = Result<Frame, CameraError>> + Send + '_>> {
            let next = self.script.lock().unwrap().pop_front();
            Box::pin(async move {
                match next {
                    Some(result) => result,
                    None => std::future::pending().await,
                }
            })
        }
    }

    /// Decoder that returns scripted payloads per call, in order.
    struct ScriptedDecoder {
        script: Mutex<VecDeque<Option<DecodedPayload>>>,
    }

    impl ScriptedDecoder {
        fn new(script: Vec<Option<DecodedPayload>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl QrDecoder for ScriptedDecoder {
        fn decode(&self, _pixels: &[u8], _width: u32, _height: u32) -> Option<DecodedPayload> {
            self.script.lock().unwrap().pop_front().flatten()
        }
    }

    fn blank_frame() -> Frame {
        Frame::from_raw(640, 480, vec![0u8; 640 * 480]).unwrap()
    }

    fn payload(text: &str) -> Option<DecodedPayload> {
        Some(DecodedPayload {
            text: text.to_string(),
            quad: Quad([
                Point { x: 10, y: 10 },
                Point { x: 50, y: 10 },
                Point { x: 50, y: 50 },
                Point { x: 10, y: 50 },
            ]),
        })
    }

    fn accepted_outcome() -> ScanOutcome {
        ScanOutcome::Accepted {
            message: "Successfully recorded run for Jordan Smith".to_string(),
            registration: Registration {
                first_name: "Jordan".to_string(),
                last_name: "Smith".to_string(),
                grade: "3".to_string(),
                teacher: "Ms. Rivera".to_string(),
            },
            scan_record: ScanRecordInfo {
                id: "scan-42".to_string(),
                season: Some(SeasonInfo {
                    name: "Fall 2025".to_string(),
                }),
                track: Some(TrackInfo {
                    name: "5K Loop".to_string(),
                    distance_miles: Some(3.1),
                }),
            },
            lap_time: Some(8.5),
            pace: Some(2.9),
        }
    }

    struct Harness {
        state: SharedKioskState,
        api: Arc<MockScanApi>,
        metrics: Arc<ScannerMetrics>,
        events_rx: mpsc::Receiver<ScanEvent>,
        shutdown: CancellationToken,
        handle: tokio::task::JoinHandle<()>,
    }

    fn spawn_daemon(
        source: ScriptedFrameSource,
        decoder: ScriptedDecoder,
        outcomes: Vec<Result<ScanOutcome, ApiError>>,
        config: ScannerConfig,
        tracks: TrackSelector,
    ) -> Harness {
        let state = KioskState::shared(tracks);
        let api = Arc::new(MockScanApi::new(outcomes));
        let metrics = Arc::new(ScannerMetrics::new());
        let (daemon, events_rx) = ScanDaemon::new(
            source,
            decoder,
            Arc::clone(&api),
            config,
            Arc::clone(&state),
            Arc::clone(&metrics),
        );
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(daemon.run(shutdown.clone()));
        Harness {
            state,
            api,
            metrics,
            events_rx,
            shutdown,
            handle,
        }
    }

    fn fast_config() -> ScannerConfig {
        ScannerConfig::new().with_cooldown(Duration::from_millis(50))
    }

    fn timed_tracks() -> TrackSelector {
        TrackSelector::with_default(
            vec![Track::new("track-1", "5K Loop").with_distance_miles(3.1)],
            Some("track-1"),
        )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_accepted_scan_end_to_end() {
        let source = ScriptedFrameSource::frames(1);
        let decoder = ScriptedDecoder::new(vec![payload(RUNNER_ID)]);
        let mut h = spawn_daemon(
            source,
            decoder,
            vec![Ok(accepted_outcome())],
            fast_config(),
            timed_tracks(),
        );
        settle().await;

        // Request carried the active track
        assert_eq!(h.api.request_count(), 1);
        let request = h.api.requests.lock().unwrap()[0].clone();
        assert_eq!(request.code, RUNNER_ID);
        assert_eq!(request.track_id.as_deref(), Some("track-1"));

        // Status is the server message plus formatted metrics
        {
            let state = h.state.lock().unwrap();
            let status = state.status.as_ref().unwrap();
            assert_eq!(status.level, StatusLevel::Success);
            assert_eq!(
                status.text,
                "Successfully recorded run for Jordan Smith | Lap time: 8:30 | Pace: 2:54/mile"
            );

            // History gained the entry with track details
            assert_eq!(state.history.len(), 1);
            let entry = state.history.latest().unwrap();
            assert_eq!(entry.student_name, "Jordan Smith");
            assert_eq!(entry.track_name.as_deref(), Some("5K Loop"));
            assert_eq!(entry.track_distance_miles, Some(3.1));
            let now = Local::now();
            let lines = entry.render_lines(now);
            assert!(lines.contains(&"Track: 5K Loop (3.1 miles)".to_string()));
        }

        let snapshot = h.metrics.snapshot();
        assert_eq!(snapshot.dispatches, 1);
        assert_eq!(snapshot.scans_accepted, 1);

        // Outline precedes the status/history events
        let first = h.events_rx.recv().await.unwrap();
        assert!(matches!(first, ScanEvent::Outline(_)));

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cooldown_suppresses_duplicate_dispatch() {
        // Two decodable frames back to back; the second lands inside the
        // cooldown window and must not produce a second request until the
        // window expires.
        let source = ScriptedFrameSource::frames(2);
        let decoder = ScriptedDecoder::new(vec![payload(RUNNER_ID), payload(RUNNER_ID)]);
        let config = ScannerConfig::new().with_cooldown(Duration::from_millis(200));
        let h = spawn_daemon(
            source,
            decoder,
            vec![Ok(accepted_outcome()), Ok(accepted_outcome())],
            config,
            timed_tracks(),
        );

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(h.api.request_count(), 1);
        assert_eq!(h.state.lock().unwrap().scan_state, ScanState::Cooldown);

        // After the window the held frame is processed and dispatched
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(h.api.request_count(), 2);

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_payload_no_dispatch_no_cooldown() {
        // A garbage payload then a real one: the garbage one must not start
        // a cooldown, so the real one dispatches immediately.
        let source = ScriptedFrameSource::frames(2);
        let decoder = ScriptedDecoder::new(vec![payload("not-a-uuid"), payload(RUNNER_ID)]);
        let h = spawn_daemon(
            source,
            decoder,
            vec![Ok(accepted_outcome())],
            ScannerConfig::new().with_cooldown(Duration::from_secs(60)),
            timed_tracks(),
        );
        settle().await;

        // Only the valid payload reached the API
        assert_eq!(h.api.request_count(), 1);
        assert_eq!(
            h.api.requests.lock().unwrap()[0].code, RUNNER_ID,
            "malformed payload must never be submitted"
        );

        let snapshot = h.metrics.snapshot();
        assert_eq!(snapshot.malformed_payloads, 1);
        assert_eq!(snapshot.dispatches, 1);

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_payload_sets_error_status() {
        let source = ScriptedFrameSource::frames(1);
        let decoder = ScriptedDecoder::new(vec![payload("hello world")]);
        let mut h = spawn_daemon(
            source,
            decoder,
            vec![],
            fast_config(),
            TrackSelector::default(),
        );
        settle().await;

        assert_eq!(h.api.request_count(), 0);
        {
            let state = h.state.lock().unwrap();
            let status = state.status.as_ref().unwrap();
            assert_eq!(status.level, StatusLevel::Warning);
            assert_eq!(status.text, "Not a valid runner ID");
            assert!(!status.persistent);
        }

        // The outline still went out before validation failed
        let first = h.events_rx.recv().await.unwrap();
        assert!(matches!(first, ScanEvent::Outline(_)));

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_scan_shows_server_message_history_unchanged() {
        let source = ScriptedFrameSource::frames(1);
        let decoder = ScriptedDecoder::new(vec![payload(RUNNER_ID)]);
        let h = spawn_daemon(
            source,
            decoder,
            vec![Ok(ScanOutcome::Rejected {
                message: "Runner not found".to_string(),
            })],
            fast_config(),
            timed_tracks(),
        );
        settle().await;

        let state = h.state.lock().unwrap();
        let status = state.status.as_ref().unwrap();
        assert_eq!(status.level, StatusLevel::Warning);
        assert_eq!(status.text, "Runner not found");
        assert!(state.history.is_empty());
        drop(state);

        assert_eq!(h.metrics.snapshot().scans_rejected, 1);

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_error_sets_error_status() {
        let source = ScriptedFrameSource::frames(1);
        let decoder = ScriptedDecoder::new(vec![payload(RUNNER_ID)]);
        let h = spawn_daemon(
            source,
            decoder,
            vec![Err(ApiError::Transport("connection refused".to_string()))],
            fast_config(),
            timed_tracks(),
        );
        settle().await;

        let state = h.state.lock().unwrap();
        let status = state.status.as_ref().unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert!(status.text.contains("connection refused"));
        assert!(state.history.is_empty());
        drop(state);

        assert_eq!(h.metrics.snapshot().transport_errors, 1);

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_track_not_attached_when_disabled() {
        let source = ScriptedFrameSource::frames(1);
        let decoder = ScriptedDecoder::new(vec![payload(RUNNER_ID)]);
        let config = fast_config().with_attach_track(false);
        let h = spawn_daemon(
            source,
            decoder,
            vec![Ok(accepted_outcome())],
            config,
            timed_tracks(),
        );
        settle().await;

        assert_eq!(h.api.request_count(), 1);
        assert!(h.api.requests.lock().unwrap()[0].track_id.is_none());

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_lap_metrics_hidden_when_disabled() {
        let source = ScriptedFrameSource::frames(1);
        let decoder = ScriptedDecoder::new(vec![payload(RUNNER_ID)]);
        let config = fast_config().with_show_lap_metrics(false);
        let h = spawn_daemon(
            source,
            decoder,
            vec![Ok(accepted_outcome())],
            config,
            timed_tracks(),
        );
        settle().await;

        let state = h.state.lock().unwrap();
        let status = state.status.as_ref().unwrap();
        assert_eq!(status.text, "Successfully recorded run for Jordan Smith");
        // The raw values are still recorded in history
        assert_eq!(state.history.latest().unwrap().lap_time, Some(8.5));

        drop(state);
        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_camera_failure_is_terminal_and_persistent() {
        let source = ScriptedFrameSource::new(vec![Err(CameraError::Unavailable(
            "permission denied".to_string(),
        ))]);
        let decoder = ScriptedDecoder::new(vec![]);
        let h = spawn_daemon(
            source,
            decoder,
            vec![],
            fast_config(),
            TrackSelector::default(),
        );

        // The loop exits on its own, no shutdown needed
        h.handle.await.unwrap();

        let state = h.state.lock().unwrap();
        assert_eq!(state.scan_state, ScanState::Idle);
        let status = state.status.as_ref().unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert!(status.persistent);
        assert!(status.text.contains("permission denied"));
    }

    #[tokio::test]
    async fn test_undecodable_frames_keep_scanning() {
        let source = ScriptedFrameSource::frames(3);
        let decoder = ScriptedDecoder::new(vec![None, None, None]);
        let h = spawn_daemon(
            source,
            decoder,
            vec![],
            fast_config(),
            TrackSelector::default(),
        );
        settle().await;

        assert_eq!(h.api.request_count(), 0);
        assert_eq!(h.state.lock().unwrap().scan_state, ScanState::Scanning);
        assert_eq!(h.metrics.snapshot().frames_processed, 3);

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_during_cooldown() {
        let source = ScriptedFrameSource::frames(1);
        let decoder = ScriptedDecoder::new(vec![payload(RUNNER_ID)]);
        let h = spawn_daemon(
            source,
            decoder,
            vec![Ok(accepted_outcome())],
            ScannerConfig::new().with_cooldown(Duration::from_secs(3600)),
            timed_tracks(),
        );
        settle().await;
        assert_eq!(h.state.lock().unwrap().scan_state, ScanState::Cooldown);

        h.shutdown.cancel();
        h.handle.await.unwrap();
        assert_eq!(h.state.lock().unwrap().scan_state, ScanState::Idle);
    }
}
