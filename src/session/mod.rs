//! Second screen session state
//!
//! [`ScreenSession`] is the one piece of mutable state the bridge keeps.
//! It is owned by the host-side entry point and lent to the controller,
//! the surface bridge and the touch path as needed.
//!
//! Host lifecycle can come from two places:
//! - the platform shim calling the `on_host_*` methods directly
//! - libseat session enable/disable (feature `seatd`)

pub mod controller;
#[cfg(all(target_os = "linux", feature = "seatd"))]
pub mod seatd;

pub use controller::{HostEvent, SessionController};
#[cfg(all(target_os = "linux", feature = "seatd"))]
pub use seatd::SeatLifecycle;

use crate::surface::{SurfaceHandle, SurfaceToken};

/// Coarse session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Second screen not requested
    Inactive,
    /// Requested, but no surface (no display, host in background)
    ActiveNoDisplay,
    /// Requested and shown on a second display
    ActiveWithSurface,
}

/// Second screen session
///
/// Invariant: `surface` is only present while a second display is attached,
/// the host is in foreground and `active` is set.
#[derive(Debug, Default)]
pub struct ScreenSession {
    pub(crate) active: bool,
    pub(crate) surface: Option<SurfaceHandle>,
}

impl ScreenSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Second screen was requested and not withdrawn
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn surface(&self) -> Option<&SurfaceHandle> {
        self.surface.as_ref()
    }

    /// `token` names the live surface
    pub fn is_current(&self, token: SurfaceToken) -> bool {
        self.surface.as_ref().map(|h| h.token()) == Some(token)
    }

    pub fn state(&self) -> SessionState {
        match (self.active, self.surface.is_some()) {
            (false, _) => SessionState::Inactive,
            (true, false) => SessionState::ActiveNoDisplay,
            (true, true) => SessionState::ActiveWithSurface,
        }
    }
}
