//! Bounded scan history.
//!
//! The kiosk shows the most recent confirmed scans, newest first. The ring
//! holds at most [`HISTORY_CAPACITY`] entries; pushing beyond that evicts
//! the oldest. Entries are immutable once created and live only for the
//! process session - there is no persistence.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::laptime::{format_lap_time, format_pace};

/// Maximum number of entries kept in the history ring.
pub const HISTORY_CAPACITY: usize = 10;

/// Placeholder shown when no scans have been recorded yet.
pub const EMPTY_HISTORY_PLACEHOLDER: &str = "No scans yet";

/// One confirmed scan, as displayed in the history list.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Backend scan-record id.
    pub id: String,
    /// Runner's full name.
    pub student_name: String,
    /// Runner's grade.
    pub grade: String,
    /// Runner's teacher.
    pub teacher: String,
    /// Season name; `None` when the backend omitted it.
    pub season_name: Option<String>,
    /// Track name; `None` when the scan had no track.
    pub track_name: Option<String>,
    /// Track distance in miles, when known.
    pub track_distance_miles: Option<f64>,
    /// When the scan was confirmed, local time.
    pub scanned_at: DateTime<Local>,
    /// Lap time in fractional minutes, when the backend computed one.
    pub lap_time: Option<f64>,
    /// Pace in fractional minutes per mile, when the backend computed one.
    pub pace: Option<f64>,
}

impl HistoryEntry {
    /// Render this entry as display lines.
    ///
    /// `now` decides whether the timestamp is shown as "Today".
    pub fn render_lines(&self, now: DateTime<Local>) -> Vec<String> {
        let mut lines = vec![
            self.student_name.clone(),
            format!("Grade: {}, Teacher: {}", self.grade, self.teacher),
            format!(
                "Season: {}",
                self.season_name.as_deref().unwrap_or("Unknown Season")
            ),
            self.track_line(),
        ];
        if let Some(lap) = self.lap_time {
            lines.push(self.performance_line(lap));
        }
        lines.push(format_scanned_at(self.scanned_at, now));
        lines
    }

    fn track_line(&self) -> String {
        match (&self.track_name, self.track_distance_miles) {
            (Some(name), Some(miles)) => format!("Track: {} ({} miles)", name, miles),
            (Some(name), None) => format!("Track: {}", name),
            (None, _) => "Track: No Track".to_string(),
        }
    }

    fn performance_line(&self, lap: f64) -> String {
        match self.pace {
            Some(pace) => format!(
                "Lap: {} | Pace: {}",
                format_lap_time(lap),
                format_pace(pace)
            ),
            None => format!("Lap: {}", format_lap_time(lap)),
        }
    }
}

/// Humanize a scan timestamp relative to `now`.
///
/// Same calendar day renders as "Today at 2:30 PM", otherwise
/// "May 8 at 2:30 PM".
fn format_scanned_at(scanned_at: DateTime<Local>, now: DateTime<Local>) -> String {
    let time = scanned_at.format("%-I:%M %p");
    if scanned_at.date_naive() == now.date_naive() {
        format!("Today at {}", time)
    } else {
        format!("{} at {}", scanned_at.format("%b %-d"), time)
    }
}

/// Bounded, most-recent-first list of confirmed scans.
#[derive(Debug, Clone, Default)]
pub struct ScanHistory {
    entries: VecDeque<HistoryEntry>,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry at the head, evicting the oldest entry when the ring
    /// is full.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back();
        }
    }

    /// Number of retained entries. Never exceeds [`HISTORY_CAPACITY`].
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries newest-first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// The most recent entry, if any.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Render the full history as display lines, newest first.
    ///
    /// An empty history renders as a single placeholder line. Entries are
    /// separated by a blank line.
    pub fn render_lines(&self, now: DateTime<Local>) -> Vec<String> {
        if self.entries.is_empty() {
            return vec![EMPTY_HISTORY_PLACEHOLDER.to_string()];
        }

        let mut lines = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(entry.render_lines(now));
        }
        lines
    }
}
