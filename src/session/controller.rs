//! Session lifecycle controller
//!
//! Decides when a second display is acquired and released as activation
//! requests and host lifecycle events come in. Nothing here ever fails
//! towards the caller: a missing display, a missing display service or a
//! presentation that cannot be shown all leave the session without a
//! surface, and the host just doesn't see a `connected` signal.

use std::rc::Rc;

use log::{debug, info, warn};

use super::ScreenSession;
use crate::display::{select_target, DisplayRegistry, SelectionPolicy};
use crate::events::{EventSink, Signal};
use crate::surface::SurfaceBridge;

/// Host application lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Host came back to foreground (resume, VT acquired)
    Foregrounded,
    /// Host left foreground (pause, VT released)
    Backgrounded,
    /// Host is being destroyed
    Terminated,
}

/// Drives a [`ScreenSession`] through activation and host lifecycle
pub struct SessionController {
    registry: Box<dyn DisplayRegistry>,
    policy: SelectionPolicy,
    sink: Rc<dyn EventSink>,
    /// Host is in foreground (assumed at startup: the host is running us)
    foreground: bool,
    /// Host began terminating; no further acquisition
    terminated: bool,
}

impl SessionController {
    pub fn new(
        registry: Box<dyn DisplayRegistry>,
        policy: SelectionPolicy,
        sink: Rc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            policy,
            sink,
            foreground: true,
            terminated: false,
        }
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Second screen requested by the host
    ///
    /// Acquires right away in foreground, otherwise on the next
    /// [`on_host_foregrounded`](Self::on_host_foregrounded).
    pub fn request_activate(&mut self, session: &mut ScreenSession, bridge: &mut SurfaceBridge) {
        if self.terminated {
            debug!("Activation after host termination ignored");
            return;
        }
        if session.active && session.surface.is_some() {
            debug!("Second screen already active");
            return;
        }

        session.active = true;
        info!("Second screen activated");
        self.acquire(session, bridge);
    }

    /// Second screen withdrawn by the host
    pub fn request_deactivate(&mut self, session: &mut ScreenSession, bridge: &mut SurfaceBridge) {
        if session.active {
            info!("Second screen deactivated");
        }
        session.active = false;
        self.release(session, bridge);
    }

    /// Host returned to foreground: restore a still-requested second screen
    pub fn on_host_foregrounded(
        &mut self,
        session: &mut ScreenSession,
        bridge: &mut SurfaceBridge,
    ) {
        if self.terminated {
            debug!("Foreground after host termination ignored");
            return;
        }
        self.foreground = true;
        if session.active {
            self.acquire(session, bridge);
        }
    }

    /// Host left foreground: nothing may render or capture input meanwhile
    ///
    /// `active` is kept so the next foreground restores the screen.
    pub fn on_host_backgrounded(
        &mut self,
        session: &mut ScreenSession,
        bridge: &mut SurfaceBridge,
    ) {
        self.foreground = false;
        self.release(session, bridge);
    }

    /// Host is going away for good
    pub fn on_host_terminated(&mut self, session: &mut ScreenSession, bridge: &mut SurfaceBridge) {
        self.request_deactivate(session, bridge);
        self.terminated = true;
        self.foreground = false;
        bridge.destroy_surface(session);
        info!("Second screen session terminated");
    }

    /// Dispatch a host lifecycle event
    pub fn on_host_event(
        &mut self,
        event: HostEvent,
        session: &mut ScreenSession,
        bridge: &mut SurfaceBridge,
    ) {
        match event {
            HostEvent::Foregrounded => self.on_host_foregrounded(session, bridge),
            HostEvent::Backgrounded => self.on_host_backgrounded(session, bridge),
            HostEvent::Terminated => self.on_host_terminated(session, bridge),
        }
    }

    /// Display set changed (hotplug)
    ///
    /// Drops a surface whose display went away, then re-runs acquisition so
    /// a newly attached or newly preferred display is picked up.
    pub fn on_displays_changed(
        &mut self,
        session: &mut ScreenSession,
        bridge: &mut SurfaceBridge,
    ) {
        if !session.active || !self.foreground || self.terminated {
            return;
        }

        if let Some(current) = session.surface().map(|h| h.display().id) {
            let attached = match self.registry.all_displays() {
                Ok(displays) => displays.iter().any(|d| d.id == current),
                Err(e) => {
                    debug!("Display registry unavailable: {}", e);
                    false
                }
            };
            if !attached {
                info!("Display {} went away", current);
                self.release(session, bridge);
            }
        }

        self.acquire(session, bridge);
    }

    /// Show the surface on the selected display
    fn acquire(&mut self, session: &mut ScreenSession, bridge: &mut SurfaceBridge) {
        if self.terminated {
            return;
        }
        if !self.foreground {
            debug!("Host in background, deferring second screen");
            return;
        }

        let target = match select_target(self.registry.as_ref(), self.policy) {
            Ok(Some(display)) => display,
            Ok(None) => {
                debug!("No second display available");
                return;
            }
            Err(e) => {
                debug!("Display registry unavailable: {}", e);
                return;
            }
        };

        if session.surface().map(|h| h.display().id) == Some(target.id) {
            debug!("Already showing on display {}", target.id);
            return;
        }

        bridge.style_host();
        // Pair the old surface's connected with its disconnected first
        self.release(session, bridge);

        match bridge.create_surface(session, &target) {
            Ok(token) => {
                info!("Second screen connected: {} on {}", token, target);
                self.sink.emit(Signal::Connected);
            }
            Err(e) => warn!("Second screen unavailable: {}", e),
        }
    }

    /// Tear down the live surface, if any, and tell the engine
    fn release(&mut self, session: &mut ScreenSession, bridge: &mut SurfaceBridge) -> bool {
        if !bridge.destroy_surface(session) {
            return false;
        }
        info!("Second screen disconnected");
        self.sink.emit(Signal::Disconnected);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Display, DisplayCategory, DisplayId};
    use crate::error::ScreenError;
    use crate::session::SessionState;
    use crate::test_support::{window, Rig, Trace};

    fn builtin() -> Display {
        Display::new(0, "DSI-1", DisplayCategory::Default)
    }

    fn lower_panel() -> Display {
        Display::new(52, "DSI-2", DisplayCategory::Default)
    }

    fn hdmi() -> Display {
        Display::new(61, "HDMI-A-1", DisplayCategory::Presentation)
    }

    fn count(rig: &Rig, signal: Signal) -> usize {
        rig.signals().iter().filter(|s| **s == signal).count()
    }

    #[test]
    fn test_activate_connects() {
        let rig = Rig::with_displays(vec![builtin(), lower_panel()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        ctl.request_activate(&mut session, &mut bridge);
        assert_eq!(session.state(), SessionState::ActiveWithSurface);
        assert_eq!(session.surface().unwrap().display().id, DisplayId(52));
        assert_eq!(rig.signals(), vec![Signal::Connected]);
    }

    #[test]
    fn test_activate_is_idempotent_with_live_surface() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        ctl.request_activate(&mut session, &mut bridge);
        let token = session.surface().unwrap().token();
        ctl.request_activate(&mut session, &mut bridge);
        ctl.request_activate(&mut session, &mut bridge);

        assert_eq!(session.surface().unwrap().token(), token);
        assert_eq!(count(&rig, Signal::Connected), 1);
    }

    #[test]
    fn test_no_display_steady_state() {
        let rig = Rig::with_displays(vec![builtin()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        for _ in 0..5 {
            ctl.request_activate(&mut session, &mut bridge);
        }
        assert_eq!(session.state(), SessionState::ActiveNoDisplay);
        assert!(rig.signals().is_empty());
    }

    #[test]
    fn test_activate_retries_when_display_appears() {
        let rig = Rig::with_displays(vec![builtin()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        ctl.request_activate(&mut session, &mut bridge);
        rig.displays.set(vec![builtin(), hdmi()]);
        ctl.request_activate(&mut session, &mut bridge);
        assert_eq!(session.state(), SessionState::ActiveWithSurface);
        assert_eq!(rig.signals(), vec![Signal::Connected]);
    }

    #[test]
    fn test_deactivate_twice() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        ctl.request_activate(&mut session, &mut bridge);
        ctl.request_deactivate(&mut session, &mut bridge);
        ctl.request_deactivate(&mut session, &mut bridge);

        assert_eq!(session.state(), SessionState::Inactive);
        assert_eq!(count(&rig, Signal::Disconnected), 1);
        let removals = rig.trace().iter().filter(|t| **t == Trace::Removed).count();
        assert_eq!(removals, 1);
    }

    #[test]
    fn test_deactivate_while_inactive_is_silent() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();
        ctl.request_deactivate(&mut session, &mut bridge);
        assert!(rig.trace().is_empty());
    }

    #[test]
    fn test_background_foreground_cycle() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        ctl.request_activate(&mut session, &mut bridge);
        ctl.on_host_backgrounded(&mut session, &mut bridge);
        assert!(session.is_active());
        assert!(session.surface().is_none());
        assert!(!ctl.is_foreground());

        ctl.on_host_foregrounded(&mut session, &mut bridge);
        assert_eq!(session.state(), SessionState::ActiveWithSurface);
        assert_eq!(
            rig.signals(),
            vec![Signal::Connected, Signal::Disconnected, Signal::Connected]
        );
    }

    #[test]
    fn test_activate_in_background_is_deferred() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        ctl.on_host_backgrounded(&mut session, &mut bridge);
        ctl.request_activate(&mut session, &mut bridge);
        assert_eq!(session.state(), SessionState::ActiveNoDisplay);
        assert!(rig.signals().is_empty());

        ctl.on_host_foregrounded(&mut session, &mut bridge);
        assert_eq!(rig.signals(), vec![Signal::Connected]);
    }

    #[test]
    fn test_foreground_without_activation_does_nothing() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();
        ctl.on_host_backgrounded(&mut session, &mut bridge);
        ctl.on_host_foregrounded(&mut session, &mut bridge);
        assert!(rig.trace().is_empty());
    }

    #[test]
    fn test_terminate_then_late_foreground() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        ctl.request_activate(&mut session, &mut bridge);
        ctl.on_host_event(HostEvent::Terminated, &mut session, &mut bridge);
        ctl.on_host_event(HostEvent::Foregrounded, &mut session, &mut bridge);
        ctl.request_activate(&mut session, &mut bridge);

        assert!(ctl.is_terminated());
        assert_eq!(session.state(), SessionState::Inactive);
        assert_eq!(rig.signals(), vec![Signal::Connected, Signal::Disconnected]);
    }

    #[test]
    fn test_presentation_failure_degrades() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();

        rig.fail_next_present();
        ctl.request_activate(&mut session, &mut bridge);
        assert_eq!(session.state(), SessionState::ActiveNoDisplay);
        assert!(rig.signals().is_empty());

        // Next attempt works again
        ctl.request_activate(&mut session, &mut bridge);
        assert_eq!(rig.signals(), vec![Signal::Connected]);
    }

    #[test]
    fn test_registry_unavailable_is_absence() {
        struct NoService;
        impl DisplayRegistry for NoService {
            fn presentation_displays(&self) -> crate::error::Result<Vec<Display>> {
                Err(ScreenError::RegistryUnavailable("display service missing".into()))
            }
            fn all_displays(&self) -> crate::error::Result<Vec<Display>> {
                Err(ScreenError::RegistryUnavailable("display service missing".into()))
            }
        }

        let rig = Rig::new();
        let (_, mut session, mut bridge) = rig.controller();
        let mut ctl = SessionController::new(
            Box::new(NoService),
            SelectionPolicy::default(),
            rig.sink(),
        );
        ctl.request_activate(&mut session, &mut bridge);
        ctl.on_displays_changed(&mut session, &mut bridge);
        assert_eq!(session.state(), SessionState::ActiveNoDisplay);
        assert!(rig.trace().is_empty());
    }

    #[test]
    fn test_hotplug_unplug_and_replug() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();
        ctl.request_activate(&mut session, &mut bridge);

        rig.displays.set(vec![builtin()]);
        ctl.on_displays_changed(&mut session, &mut bridge);
        assert_eq!(session.state(), SessionState::ActiveNoDisplay);

        rig.displays.set(vec![builtin(), hdmi()]);
        ctl.on_displays_changed(&mut session, &mut bridge);
        assert_eq!(session.state(), SessionState::ActiveWithSurface);
        assert_eq!(
            rig.signals(),
            vec![Signal::Connected, Signal::Disconnected, Signal::Connected]
        );
    }

    #[test]
    fn test_hotplug_prefers_new_presentation_display() {
        let rig = Rig::with_displays(vec![builtin(), lower_panel()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();
        ctl.request_activate(&mut session, &mut bridge);
        let old = session.surface().unwrap().token();
        bridge.on_surface_ready(&mut session, old, window(0x1000));

        rig.displays.set(vec![builtin(), lower_panel(), hdmi()]);
        ctl.on_displays_changed(&mut session, &mut bridge);
        let new = session.surface().unwrap().token();
        assert_eq!(session.surface().unwrap().display().id, hdmi().id);
        bridge.on_surface_ready(&mut session, new, window(0x2000));

        let trace = rig.trace();
        let removed = trace.iter().position(|t| *t == Trace::Removed).unwrap();
        let available = trace
            .iter()
            .position(|t| *t == Trace::Available(0x2000))
            .unwrap();
        assert!(removed < available);
        assert_eq!(
            rig.signals(),
            vec![Signal::Connected, Signal::Disconnected, Signal::Connected]
        );
    }

    #[test]
    fn test_hotplug_ignored_when_inactive_or_background() {
        let rig = Rig::with_displays(vec![builtin(), hdmi()]);
        let (mut ctl, mut session, mut bridge) = rig.controller();
        ctl.on_displays_changed(&mut session, &mut bridge);
        assert!(rig.trace().is_empty());

        ctl.request_activate(&mut session, &mut bridge);
        ctl.on_host_backgrounded(&mut session, &mut bridge);
        let before = rig.trace().len();
        ctl.on_displays_changed(&mut session, &mut bridge);
        assert_eq!(rig.trace().len(), before);
    }
}
