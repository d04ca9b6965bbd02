//! Backend scan API.
//!
//! The kiosk submits each well-formed runner id to `POST /api/scan` and
//! receives a terminal outcome: the scan was recorded (with runner identity
//! and, when a prior lap exists, lap time and pace), or it was rejected
//! (valid id, runner unresolved). Neither outcome is retried by the client.
//!
//! The [`ScanApi`] trait follows the dependency-injection pattern used for
//! HTTP elsewhere in this codebase: the daemon talks to the trait, tests
//! supply mocks, and [`HttpScanApi`] is the reqwest-backed production
//! implementation.

mod client;
mod types;

pub use client::{HttpScanApi, ScanApi, DEFAULT_TIMEOUT};
#[cfg(test)]
pub use client::tests;
pub use types::{
    ApiError, Registration, ScanOutcome, ScanRecordInfo, ScanRequest, SeasonInfo, TrackInfo,
};
