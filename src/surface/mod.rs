//! Render surface on the second display
//!
//! [`SurfaceBridge`] owns the single presentation window shown on the
//! second display and is the only thing that talks to the native backend.
//! The window itself is created by a platform [`Presenter`]; its drawable
//! surface becomes ready asynchronously and is reported back through
//! [`SurfaceBridge::on_surface_ready`].

pub mod backend;
pub mod chrome;

use std::ffi::c_void;
use std::fmt;

use log::{debug, info, warn};

use crate::config::ChromeConfig;
use crate::display::Display;
use crate::error::Result;
use crate::session::ScreenSession;

pub use backend::WindowSlot;
pub use chrome::{ChromeStyler, ChromeTarget, NoChrome, SystemUiFlags};

/// Identifies one presentation window for its whole lifetime
///
/// Platform callbacks (readiness, loss, touch, visibility) carry the token
/// of the window they came from so that callbacks from an already replaced
/// window can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceToken(pub u64);

impl fmt::Display for SurfaceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Native drawable handed to the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRef {
    raw: usize,
    width: u32,
    height: u32,
}

impl SurfaceRef {
    /// Wrap a platform window pointer (ANativeWindow*, wl_surface*, ...)
    pub fn new(raw: *mut c_void, width: u32, height: u32) -> Self {
        Self {
            raw: raw as usize,
            width,
            height,
        }
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.raw as *mut c_void
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Readiness of the drawable behind a presentation window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Window shown, drawable not delivered yet
    Pending,
    /// Drawable delivered and handed to the backend
    Ready(SurfaceRef),
}

/// Live presentation window owned by the platform
pub trait Presentation {
    /// False once the platform has torn the window down on its own
    /// (host destroyed, display removed)
    fn is_alive(&self) -> bool;

    /// Dismiss the window and release its resources
    fn dismiss(self: Box<Self>);
}

/// Platform collaborator that creates presentation windows
pub trait Presenter {
    /// Show a non-focusable presentation window on `display`
    ///
    /// The window must route its touch callbacks, drawable readiness and
    /// loss, and UI visibility changes back to the bridge tagged with
    /// `token`.
    fn present(&mut self, display: &Display, token: SurfaceToken) -> Result<Box<dyn Presentation>>;
}

/// Native rendering backend
///
/// Both calls are fast handoffs made on the owning context; rendering
/// happens elsewhere.
pub trait NativeBackend {
    fn surface_available(&self, surface: SurfaceRef);
    fn surface_removed(&self);
}

/// The surface currently shown on the second display
pub struct SurfaceHandle {
    token: SurfaceToken,
    display: Display,
    state: SurfaceState,
    presentation: Box<dyn Presentation>,
}

impl SurfaceHandle {
    pub fn token(&self) -> SurfaceToken {
        self.token
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SurfaceState::Ready(_))
    }

    /// Dismiss the window unless the platform already did
    fn release(self) {
        if self.presentation.is_alive() {
            self.presentation.dismiss();
        } else {
            debug!("{} already gone, skipping dismiss", self.token);
        }
    }
}

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("token", &self.token)
            .field("display", &self.display.id)
            .field("state", &self.state)
            .finish()
    }
}

/// Owner of the second display surface
pub struct SurfaceBridge {
    presenter: Box<dyn Presenter>,
    backend: Box<dyn NativeBackend>,
    chrome: Box<dyn ChromeStyler>,
    immersive: bool,
    next_token: u64,
}

impl SurfaceBridge {
    pub fn new(
        presenter: Box<dyn Presenter>,
        backend: Box<dyn NativeBackend>,
        chrome: Box<dyn ChromeStyler>,
        config: &ChromeConfig,
    ) -> Self {
        Self {
            presenter,
            backend,
            chrome,
            immersive: config.immersive,
            next_token: 1,
        }
    }

    /// Show a new surface on `display`, replacing the current one
    ///
    /// The previous surface is fully torn down (backend told first) before
    /// the new window is requested, so the backend never holds two targets.
    pub fn create_surface(
        &mut self,
        session: &mut ScreenSession,
        display: &Display,
    ) -> Result<SurfaceToken> {
        self.destroy_surface(session);

        let token = SurfaceToken(self.next_token);
        self.next_token += 1;

        let presentation = self.presenter.present(display, token)?;
        if self.immersive {
            self.chrome
                .apply(ChromeTarget::Surface(token), SystemUiFlags::immersive());
        }

        info!("{} shown on display {}", token, display);
        session.surface = Some(SurfaceHandle {
            token,
            display: display.clone(),
            state: SurfaceState::Pending,
            presentation,
        });
        Ok(token)
    }

    /// Tear down the current surface
    ///
    /// Returns false when there was nothing to tear down.
    pub fn destroy_surface(&mut self, session: &mut ScreenSession) -> bool {
        let Some(handle) = session.surface.take() else {
            return false;
        };

        // Backend must stop drawing before the window goes away
        self.backend.surface_removed();
        info!("{} dismissed from display {}", handle.token, handle.display);
        handle.release();
        true
    }

    /// Drawable for `token` is ready
    ///
    /// Returns true when the backend was notified.
    pub fn on_surface_ready(
        &mut self,
        session: &mut ScreenSession,
        token: SurfaceToken,
        surface: SurfaceRef,
    ) -> bool {
        let Some(handle) = current(session, token) else {
            debug!("Ignoring readiness of stale {}", token);
            return false;
        };

        if let SurfaceState::Ready(prev) = handle.state {
            if prev == surface {
                return false;
            }
            // Drawable swapped without a loss callback in between
            warn!("{} delivered a new drawable while ready", token);
            self.backend.surface_removed();
        }

        let (w, h) = surface.size();
        info!("{} ready ({}x{})", token, w, h);
        handle.state = SurfaceState::Ready(surface);
        self.backend.surface_available(surface);
        true
    }

    /// Platform destroyed the drawable for `token` while the window stays
    ///
    /// The surface goes back to pending; the platform may deliver a new
    /// drawable later.
    pub fn on_surface_lost(&mut self, session: &mut ScreenSession, token: SurfaceToken) -> bool {
        let Some(handle) = current(session, token) else {
            debug!("Ignoring loss of stale {}", token);
            return false;
        };
        if !handle.is_ready() {
            return false;
        }

        info!("{} drawable lost", token);
        self.backend.surface_removed();
        handle.state = SurfaceState::Pending;
        true
    }

    /// Platform UI visibility changed on a presentation window
    pub fn on_ui_visibility_changed(
        &mut self,
        session: &ScreenSession,
        token: SurfaceToken,
        visibility: SystemUiFlags,
    ) {
        if !self.immersive || !session.is_current(token) {
            return;
        }
        if visibility.left_fullscreen() {
            debug!("{} left fullscreen ({:?}), re-applying", token, visibility);
            self.chrome
                .apply(ChromeTarget::Surface(token), SystemUiFlags::immersive());
        }
    }

    /// Style the host's own window before a second screen is acquired
    pub fn style_host(&mut self) {
        if self.immersive {
            self.chrome.apply(ChromeTarget::Host, SystemUiFlags::immersive());
        }
    }
}

fn current(session: &mut ScreenSession, token: SurfaceToken) -> Option<&mut SurfaceHandle> {
    session.surface.as_mut().filter(|h| h.token == token)
}
