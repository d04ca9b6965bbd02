//! Track selection for scan requests.
//!
//! A timing station serves one course at a time. The selector holds at most
//! one active track; selecting a new one replaces the previous selection
//! before any subsequent scan uses it, and a designated default track is
//! auto-selected at construction so the operator never has to touch it for
//! the common case.

/// A course runners are timed on.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Stable identifier attached to scan requests.
    pub id: String,
    /// Display name, e.g. "5K Loop".
    pub name: String,
    /// Course length in miles, when known.
    pub distance_miles: Option<f64>,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            distance_miles: None,
        }
    }

    /// Set the course distance.
    pub fn with_distance_miles(mut self, miles: f64) -> Self {
        self.distance_miles = Some(miles);
        self
    }
}

/// Holds the known tracks and the single active selection.
#[derive(Debug, Clone, Default)]
pub struct TrackSelector {
    tracks: Vec<Track>,
    active_id: Option<String>,
}

impl TrackSelector {
    /// Create a selector with no active track.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            active_id: None,
        }
    }

    /// Create a selector and auto-select the designated default track.
    ///
    /// An unknown default id leaves the selection empty.
    pub fn with_default(tracks: Vec<Track>, default_id: Option<&str>) -> Self {
        let mut selector = Self::new(tracks);
        if let Some(id) = default_id {
            selector.select(id);
        }
        selector
    }

    /// All known tracks.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Select a track by id, replacing any prior selection.
    ///
    /// Returns `false` (and keeps the prior selection) when the id is
    /// unknown.
    pub fn select(&mut self, id: &str) -> bool {
        if self.tracks.iter().any(|t| t.id == id) {
            self.active_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Clear the active selection.
    pub fn clear(&mut self) {
        self.active_id = None;
    }

    /// The currently active track, if any.
    pub fn active(&self) -> Option<&Track> {
        let id = self.active_id.as_deref()?;
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Id of the active track, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }
}
