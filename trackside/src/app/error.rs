//! Application error types.

use std::fmt;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::frame::CameraError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to load or parse configuration.
    Config(ConfigError),

    /// Failed to construct the API client.
    ApiClient(ApiError),

    /// The frame source could not be opened.
    Camera(CameraError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => {
                write!(f, "Configuration error: {}", e)
            }
            AppError::ApiClient(e) => {
                write!(f, "Failed to create API client: {}", e)
            }
            AppError::Camera(e) => {
                write!(f, "Failed to open frame source: {}", e)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::ApiClient(e) => Some(e),
            AppError::Camera(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        AppError::ApiClient(e)
    }
}

impl From<CameraError> for AppError {
    fn from(e: CameraError) -> Self {
        AppError::Camera(e)
    }
}
