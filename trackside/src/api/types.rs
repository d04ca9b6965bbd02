//! Wire types for the scan endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the scan API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Network-level failure: connect, timeout, TLS.
    #[error("scan request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status and no parseable body.
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    /// The response body did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

/// Request body for `POST /api/scan`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScanRequest {
    /// Decoded runner id in canonical UUID form.
    pub code: String,
    /// Active track id, attached only when a track is selected.
    #[serde(rename = "trackId", skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
}

/// Runner identity returned on a successful scan.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub grade: String,
    pub teacher: String,
}

impl Registration {
    /// The runner's display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Season attached to a scan record.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SeasonInfo {
    pub name: String,
}

/// Track attached to a scan record.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub name: String,
    #[serde(default)]
    pub distance_miles: Option<f64>,
}

/// The persisted scan record, as echoed back by the server.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecordInfo {
    pub id: String,
    #[serde(default)]
    pub season: Option<SeasonInfo>,
    #[serde(default)]
    pub track: Option<TrackInfo>,
}

/// Raw response body. Converted to [`ScanOutcome`] after shape validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScanResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub registration: Option<Registration>,
    #[serde(default)]
    pub scan_record: Option<ScanRecordInfo>,
    #[serde(default)]
    pub lap_time: Option<f64>,
    #[serde(default)]
    pub pace: Option<f64>,
}

/// Terminal outcome of a scan submission.
///
/// Both variants end the attempt; the client never retries either.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Runner found, scan recorded.
    Accepted {
        /// Server-provided base message, e.g. "Successfully recorded run
        /// for Jordan Smith".
        message: String,
        registration: Registration,
        scan_record: ScanRecordInfo,
        /// Elapsed fractional minutes since the runner's previous lap on
        /// this track, when one exists.
        lap_time: Option<f64>,
        /// Fractional minutes per mile, when computable.
        pace: Option<f64>,
    },
    /// Valid UUID, but the runner could not be resolved.
    Rejected {
        /// Server-provided message, rendered verbatim.
        message: String,
    },
}

impl TryFrom<ScanResponse> for ScanOutcome {
    type Error = ApiError;

    fn try_from(response: ScanResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Ok(ScanOutcome::Rejected {
                message: response.message,
            });
        }

        // A success without identity or record is a malformed server reply,
        // not a usable outcome.
        let registration = response.registration.ok_or_else(|| {
            ApiError::UnexpectedResponse("success without registration".to_string())
        })?;
        let scan_record = response
            .scan_record
            .ok_or_else(|| ApiError::UnexpectedResponse("success without scanRecord".to_string()))?;

        Ok(ScanOutcome::Accepted {
            message: response.message,
            registration,
            scan_record,
            lap_time: response.lap_time,
            pace: response.pace,
        })
    }
}
