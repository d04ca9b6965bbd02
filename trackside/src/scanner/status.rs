//! Operator-facing status messages.

/// Severity of a status message, used by views to pick styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Neutral progress feedback ("Processing...").
    Info,
    /// A scan was recorded.
    Success,
    /// The scan was refused but the station is healthy.
    Warning,
    /// Something is broken.
    Error,
}

/// One line of operator feedback.
///
/// A persistent message (camera failure) stays on screen and cannot be
/// replaced by ordinary scan feedback; only another persistent message
/// overwrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
    pub persistent: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Error, text)
    }

    /// Mark this message as persistent.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            persistent: false,
        }
    }
}
