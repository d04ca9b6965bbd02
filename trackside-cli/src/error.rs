//! CLI error types.

use std::fmt;

use trackside::app::AppError;
use trackside::config::ConfigError;
use trackside::frame::CameraError;

/// Errors surfaced to the terminal user.
#[derive(Debug)]
pub enum CliError {
    /// Bad arguments or unusable configuration.
    Config(String),

    /// The frame source could not be opened.
    Camera(CameraError),

    /// The application failed to start.
    App(AppError),

    /// Failed to create the Tokio runtime.
    Runtime(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Camera(e) => write!(f, "Camera error: {}", e),
            CliError::App(e) => write!(f, "Startup failed: {}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create runtime: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) | CliError::Runtime(_) => None,
            CliError::Camera(e) => Some(e),
            CliError::App(e) => Some(e),
        }
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<CameraError> for CliError {
    fn from(e: CameraError) -> Self {
        CliError::Camera(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
