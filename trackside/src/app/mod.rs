//! Application assembly and lifecycle.
//!
//! This module wires the pieces together: configuration resolution, the
//! scan daemon, shared kiosk state, and graceful shutdown. Frontends
//! (the CLI, a future display server) talk to [`KioskApp`] rather than
//! assembling the pipeline themselves.

mod bootstrap;
mod config;
mod error;

pub use bootstrap::KioskApp;
pub use config::AppConfig;
pub use error::AppError;
