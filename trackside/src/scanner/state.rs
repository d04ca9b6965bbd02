//! Shared kiosk state.

use std::sync::{Arc, Mutex};

use crate::history::ScanHistory;
use crate::track::TrackSelector;

use super::status::StatusMessage;

/// Where the scan loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Not scanning: before start or after a terminal camera failure.
    #[default]
    Idle,
    /// Pulling frames and looking for codes.
    Scanning,
    /// A payload was dispatched; waiting on the backend.
    AwaitingServer,
    /// Holding after a dispatch so one badge yields one lap.
    Cooldown,
}

/// State shared between the scan daemon and its views.
///
/// Held behind a mutex; lock scopes are short and never span an await.
#[derive(Debug)]
pub struct KioskState {
    /// Recent confirmed scans, newest first.
    pub history: ScanHistory,
    /// Known tracks and the active selection.
    pub tracks: TrackSelector,
    /// Current operator-facing status, if any.
    pub status: Option<StatusMessage>,
    /// Where the scan loop currently is.
    pub scan_state: ScanState,
}

/// Handle shared between the daemon and any number of views.
pub type SharedKioskState = Arc<Mutex<KioskState>>;

impl KioskState {
    pub fn new(tracks: TrackSelector) -> Self {
        Self {
            history: ScanHistory::new(),
            tracks,
            status: None,
            scan_state: ScanState::Idle,
        }
    }

    /// Wrap a fresh state for sharing.
    pub fn shared(tracks: TrackSelector) -> SharedKioskState {
        Arc::new(Mutex::new(Self::new(tracks)))
    }

    /// Replace the current status message.
    ///
    /// A persistent status blocks replacement by non-persistent messages.
    /// Returns whether the new message was applied.
    pub fn set_status(&mut self, status: StatusMessage) -> bool {
        if let Some(current) = &self.status {
            if current.persistent && !status.persistent {
                return false;
            }
        }
        self.status = Some(status);
        true
    }
}
