//! Frame acquisition for the scan loop.
//!
//! A [`Frame`] is an immutable grayscale snapshot produced once per tick and
//! discarded after decoding. [`FrameSource`] abstracts where frames come from
//! so the scan daemon can run against a live capture backend, a pushed
//! channel of frames, or a sequence of image files in tests and demos.
//!
//! Camera failures are never swallowed here: every implementation reports
//! [`CameraError`] to the caller, which surfaces it as a persistent status
//! message. No source retries automatically.

use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Errors raised while acquiring frames.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    /// Camera access was denied or the capability is absent.
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    /// The stream was established but stopped delivering frames.
    #[error("camera stream lost")]
    StreamLost,
}

/// Preferred camera facing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    /// Rear camera, pointed at the runners.
    #[default]
    Environment,
    /// Front camera.
    User,
}

impl FacingMode {
    /// Parse a config-file value. Unknown values fall back to `Environment`.
    pub fn from_config_value(value: &str) -> Self {
        match value {
            "user" => FacingMode::User,
            _ => FacingMode::Environment,
        }
    }

    /// The config-file representation of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

/// Capture preferences handed to real camera backends.
///
/// These are requests, not guarantees: the device may deliver a different
/// resolution, which is why [`crate::region::ScanRegion`] is recomputed from
/// actual frame dimensions every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConfig {
    /// Preferred facing mode.
    pub facing: FacingMode,
    /// Target capture width in pixels.
    pub ideal_width: u32,
    /// Target capture height in pixels.
    pub ideal_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// An immutable grayscale frame snapshot.
///
/// Pixels are 8-bit luma, row-major, tightly packed (`width * height` bytes).
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Create a frame from raw luma pixels.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw luma pixel buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Source of frames for the scan daemon.
///
/// The boxed-future shape keeps the trait object-safe so sources can be
/// swapped at runtime and mocked in tests.
pub trait FrameSource: Send {
    /// Wait for the next frame.
    ///
    /// Returns [`CameraError`] when the stream cannot deliver any further
    /// frames; the error is terminal for the scan loop.
    fn next_frame(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Frame, CameraError>> + Send + '_>>;
}

/// Frame source fed by a capture backend over a channel.
///
/// Whatever owns the actual device (V4L2 loop, GStreamer appsink, a test)
/// pushes frames into the sender half; the scan daemon consumes them here.
/// A closed channel is reported as a lost stream.
pub struct ChannelFrameSource {
    rx: mpsc::Receiver<Frame>,
}

impl ChannelFrameSource {
    /// Create a channel-backed source with the given buffer capacity.
    ///
    /// Returns the producer half alongside the source. A small capacity is
    /// deliberate: stale frames are worthless, the producer should drop
    /// rather than queue them.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Frame>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

impl FrameSource for ChannelFrameSource {
    fn next_frame(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Frame, CameraError>> + Send + '_>> {
        Box::pin(async move { self.rx.recv().await.ok_or(CameraError::StreamLost) })
    }
}

/// Frame source that decodes a fixed sequence of image files.
///
/// Used by the CLI demo mode and in tests. Files that fail to load are
/// skipped with a warning; an exhausted sequence ends the stream.
pub struct ImageSequenceSource {
    paths: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    /// Build a source from all image files in a directory, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Unavailable`] if the directory cannot be read
    /// or contains no image files.
    pub fn from_dir(dir: &Path) -> Result<Self, CameraError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| CameraError::Unavailable(format!("{}: {}", dir.display(), e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_image_file(p))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(CameraError::Unavailable(format!(
                "no image files in {}",
                dir.display()
            )));
        }

        Ok(Self {
            paths: paths.into(),
        })
    }

    /// Build a source from an explicit list of files.
    pub fn from_files(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: paths.into(),
        }
    }

    /// Number of frames remaining.
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }

    fn load_next(&mut self) -> Result<Frame, CameraError> {
        while let Some(path) = self.paths.pop_front() {
            match image::open(&path) {
                Ok(img) => {
                    let luma = img.to_luma8();
                    let (width, height) = luma.dimensions();
                    debug!(path = %path.display(), width, height, "Loaded frame");
                    // to_luma8 output is tightly packed, from_raw cannot fail here
                    if let Some(frame) = Frame::from_raw(width, height, luma.into_raw()) {
                        return Ok(frame);
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable frame");
                }
            }
        }
        Err(CameraError::StreamLost)
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Frame, CameraError>> + Send + '_>> {
        let result = self.load_next();
        Box::pin(async move { result })
    }
}

fn is_image_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("png" | "jpg" | "jpeg" | "bmp")
    )
}
