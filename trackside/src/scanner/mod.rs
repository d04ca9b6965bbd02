//! The scan loop: frames in, confirmed laps out.
//!
//! # Architecture
//!
//! The [`ScanDaemon`] owns a sequential pipeline driven by a frame source:
//!
//! ```text
//! FrameSource ──► crop center ──► QrDecoder ──► validate ──► ScanApi
//!                                   │                           │
//!                                   ▼                           ▼
//!                              Outline event          status + history update
//! ```
//!
//! One frame is in flight at a time. After a payload is dispatched the loop
//! holds in a cooldown so the same badge sitting in front of the camera does
//! not produce duplicate laps. The cooldown clock starts when the request is
//! dispatched, not when the server answers.
//!
//! Shared kiosk state (history, track selection, current status) lives in
//! [`KioskState`] behind a mutex; views subscribe to [`ScanEvent`]s to know
//! when to re-render.

mod config;
mod daemon;
mod state;
mod status;
mod validate;

pub use config::{ScannerConfig, DEFAULT_COOLDOWN_MS, DEFAULT_REGION_SIZE};
pub use daemon::{ScanDaemon, ScanEvent};
pub use state::{KioskState, ScanState, SharedKioskState};
pub use status::{StatusLevel, StatusMessage};
pub use validate::is_runner_id;
