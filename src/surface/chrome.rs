//! Window chrome flags
//!
//! The actual styling (hiding system bars, fullscreen layout) belongs to the
//! platform. The bridge only decides when styling has to be (re)applied.

use bitflags::bitflags;

use super::SurfaceToken;

bitflags! {
    /// System UI visibility flags, bit-compatible with the platform values
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SystemUiFlags: u32 {
        const LOW_PROFILE = 0x0000_0001;
        const HIDE_NAVIGATION = 0x0000_0002;
        const FULLSCREEN = 0x0000_0004;
        const LAYOUT_STABLE = 0x0000_0100;
        const LAYOUT_HIDE_NAVIGATION = 0x0000_0200;
        const LAYOUT_FULLSCREEN = 0x0000_0400;
        const IMMERSIVE = 0x0000_0800;
        const IMMERSIVE_STICKY = 0x0000_1000;
    }
}

impl SystemUiFlags {
    /// Sticky immersive fullscreen with navigation hidden
    pub fn immersive() -> Self {
        Self::IMMERSIVE_STICKY
            | Self::LAYOUT_STABLE
            | Self::LAYOUT_HIDE_NAVIGATION
            | Self::LAYOUT_FULLSCREEN
            | Self::HIDE_NAVIGATION
            | Self::FULLSCREEN
    }

    /// The platform reported visibility that dropped out of fullscreen
    pub fn left_fullscreen(self) -> bool {
        !self.contains(Self::FULLSCREEN)
    }
}

/// Window whose chrome is being styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeTarget {
    /// The host application's own window
    Host,
    /// A presentation window on the second display
    Surface(SurfaceToken),
}

/// Platform collaborator that applies chrome flags to a window
pub trait ChromeStyler {
    fn apply(&mut self, target: ChromeTarget, flags: SystemUiFlags);
}

/// Styler for platforms without system bars
pub struct NoChrome;

impl ChromeStyler for NoChrome {
    fn apply(&mut self, _target: ChromeTarget, _flags: SystemUiFlags) {}
}
