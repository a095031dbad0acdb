//! secondscreen - second display bridge for engine hosts
//!
//! Shows a render surface on a second physical display (external monitor,
//! lower panel of a dual-screen handheld), hands its native window to the
//! engine's rendering backend and forwards touch input from that display
//! back to the engine as signals.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Host shim / ScreenHandle (other threads)    │
//! ├──────────────────────────────────────────────┤
//! │  SecondScreen                                │
//! │    SessionController  →  DisplayRegistry     │
//! │          ↓                                   │
//! │    SurfaceBridge  →  Presenter / Backend     │
//! │          ↓                                   │
//! │    InputForwarder  →  EventSink (signals)    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on the one context that owns [`SecondScreen`]. Linux
//! adapters for DRM connectors, udev hotplug, libinput touch and libseat
//! live in [`display`], [`input`] and [`session`].

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod events;
pub mod input;
pub mod screen;
pub mod session;
pub mod surface;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use dispatch::ScreenHandle;
pub use display::{Display, DisplayCategory, DisplayId, DisplayList, DisplayRegistry};
pub use error::{Result, ScreenError};
pub use events::{ChannelSink, EventSink, Signal};
pub use input::{InputForwarder, MotionEvent, Pointer, TouchAction};
pub use screen::{Platform, SecondScreen};
pub use session::{HostEvent, ScreenSession, SessionController, SessionState};
pub use surface::{
    NativeBackend, Presentation, Presenter, SurfaceBridge, SurfaceRef, SurfaceToken, WindowSlot,
};

/// Install env_logger with the configured default filter
///
/// `RUST_LOG` still wins when set. Does nothing if the host already
/// installed a logger.
pub fn init_logger(config: &Config) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already installed");
    }
}
