//! Host-facing entry point
//!
//! [`SecondScreen`] wires the session controller, surface bridge and input
//! forwarder around one [`ScreenSession`] and exposes the calls a platform
//! shim makes: activation requests, host lifecycle, display changes and
//! the callbacks coming back from the presentation window.

use std::rc::Rc;

use log::{debug, trace};

use crate::config::Config;
use crate::dispatch::{Command, CommandQueue, ScreenHandle};
use crate::display::{DisplayRegistry, SelectionPolicy};
use crate::events::EventSink;
use crate::input::{InputForwarder, MotionEvent};
use crate::session::{HostEvent, ScreenSession, SessionController, SessionState};
use crate::surface::{
    ChromeStyler, NativeBackend, Presenter, SurfaceBridge, SurfaceRef, SurfaceToken,
    SystemUiFlags,
};

/// Platform collaborators
pub struct Platform {
    pub registry: Box<dyn DisplayRegistry>,
    pub presenter: Box<dyn Presenter>,
    pub backend: Box<dyn NativeBackend>,
    pub chrome: Box<dyn ChromeStyler>,
    pub sink: Rc<dyn EventSink>,
}

/// Second screen bridge for one host
pub struct SecondScreen {
    session: ScreenSession,
    controller: SessionController,
    bridge: SurfaceBridge,
    forwarder: InputForwarder,
    queue: CommandQueue,
}

impl SecondScreen {
    pub fn new(platform: Platform, config: &Config) -> Self {
        let Platform {
            registry,
            presenter,
            backend,
            chrome,
            sink,
        } = platform;

        Self {
            session: ScreenSession::new(),
            controller: SessionController::new(
                registry,
                SelectionPolicy::from(&config.display),
                sink.clone(),
            ),
            bridge: SurfaceBridge::new(presenter, backend, chrome, &config.chrome),
            forwarder: InputForwarder::new(sink),
            queue: CommandQueue::new(),
        }
    }

    /// Handle for posting from other threads
    pub fn handle(&self) -> ScreenHandle {
        self.queue.handle()
    }

    /// Run commands posted through [`ScreenHandle`]s
    ///
    /// Returns the number of commands run.
    pub fn pump(&mut self) -> usize {
        let commands = self.queue.drain();
        for &command in &commands {
            trace!("Running {:?}", command);
            match command {
                Command::InitScreen => self.init_screen(),
                Command::DestroyScreen => self.destroy_screen(),
                Command::Host(event) => self.on_host_event(event),
                Command::DisplaysChanged => self.on_displays_changed(),
            }
        }
        commands.len()
    }

    /// Host asks for the second screen
    pub fn init_screen(&mut self) {
        self.controller
            .request_activate(&mut self.session, &mut self.bridge);
    }

    /// Host withdraws the second screen
    pub fn destroy_screen(&mut self) {
        self.controller
            .request_deactivate(&mut self.session, &mut self.bridge);
    }

    pub fn on_host_event(&mut self, event: HostEvent) {
        self.controller
            .on_host_event(event, &mut self.session, &mut self.bridge);
    }

    pub fn on_host_foregrounded(&mut self) {
        self.on_host_event(HostEvent::Foregrounded);
    }

    pub fn on_host_backgrounded(&mut self) {
        self.on_host_event(HostEvent::Backgrounded);
    }

    pub fn on_host_terminated(&mut self) {
        self.on_host_event(HostEvent::Terminated);
    }

    pub fn on_displays_changed(&mut self) {
        self.controller
            .on_displays_changed(&mut self.session, &mut self.bridge);
    }

    /// Presentation window delivered its drawable
    pub fn on_surface_ready(&mut self, token: SurfaceToken, surface: SurfaceRef) -> bool {
        self.bridge
            .on_surface_ready(&mut self.session, token, surface)
    }

    /// Presentation window lost its drawable
    pub fn on_surface_lost(&mut self, token: SurfaceToken) -> bool {
        self.bridge.on_surface_lost(&mut self.session, token)
    }

    pub fn on_ui_visibility_changed(&mut self, token: SurfaceToken, visibility: SystemUiFlags) {
        self.bridge
            .on_ui_visibility_changed(&self.session, token, visibility);
    }

    /// Touch callback from a presentation window
    ///
    /// Always consumed. Events from a window that is no longer current are
    /// dropped.
    pub fn on_touch(&mut self, token: SurfaceToken, event: &MotionEvent) -> bool {
        if !self.session.is_current(token) {
            debug!("Dropping touch from stale {}", token);
            return true;
        }
        self.forwarder.forward(event)
    }

    pub fn session(&self) -> &ScreenSession {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }
}
