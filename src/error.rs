//! Error types for the second screen bridge
//!
//! None of these ever reach the host: the session controller logs them
//! and degrades to "second screen currently unavailable".

use thiserror::Error;

/// Result type for second screen operations
pub type Result<T> = std::result::Result<T, ScreenError>;

/// Second screen error types
#[derive(Error, Debug)]
pub enum ScreenError {
    /// Display enumeration failed (service missing, device unreadable)
    #[error("Display registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Presentation window could not be created on the target display
    #[error("Presentation failed on display {display}: {reason}")]
    PresentationFailed { display: u32, reason: String },

    /// Host context is gone (terminating or already destroyed)
    #[error("Host context is no longer available")]
    HostGone,

    /// Device I/O error
    #[error("Device I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScreenError {
    /// Build a registry error from any adapter error, keeping its context chain
    pub fn registry(err: impl std::fmt::Display) -> Self {
        Self::RegistryUnavailable(format!("{:#}", err))
    }

    /// Build a presentation error for a display
    pub fn presentation(display: u32, reason: impl Into<String>) -> Self {
        Self::PresentationFailed {
            display,
            reason: reason.into(),
        }
    }
}
