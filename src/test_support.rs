//! Recording fakes shared by the unit tests
//!
//! Every fake writes into one ordered trace so tests can assert on the
//! relative order of backend calls, window changes and signals.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::rc::Rc;

use crate::config::{ChromeConfig, Config};
use crate::display::{Display, DisplayId, DisplayList, SelectionPolicy};
use crate::error::{Result, ScreenError};
use crate::events::{EventSink, Signal};
use crate::screen::{Platform, SecondScreen};
use crate::session::{ScreenSession, SessionController};
use crate::surface::{
    ChromeStyler, ChromeTarget, NativeBackend, Presentation, Presenter, SurfaceBridge,
    SurfaceRef, SurfaceToken, SystemUiFlags,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Shown(SurfaceToken, DisplayId),
    Dismissed(SurfaceToken),
    Chrome(ChromeTarget),
    Available(usize),
    Removed,
    Signal(Signal),
}

type Log = Rc<RefCell<Vec<Trace>>>;

pub fn window(raw: usize) -> SurfaceRef {
    SurfaceRef::new(raw as *mut c_void, 1920, 1080)
}

struct FakePresentation {
    token: SurfaceToken,
    alive: Rc<Cell<bool>>,
    log: Log,
}

impl Presentation for FakePresentation {
    fn is_alive(&self) -> bool {
        self.alive.get()
    }

    fn dismiss(self: Box<Self>) {
        self.alive.set(false);
        self.log.borrow_mut().push(Trace::Dismissed(self.token));
    }
}

struct FakePresenter {
    log: Log,
    live: Rc<RefCell<Vec<Rc<Cell<bool>>>>>,
    fail_next: Rc<Cell<bool>>,
}

impl Presenter for FakePresenter {
    fn present(&mut self, display: &Display, token: SurfaceToken) -> Result<Box<dyn Presentation>> {
        if self.fail_next.replace(false) {
            return Err(ScreenError::presentation(display.id.0, "window manager refused"));
        }
        let alive = Rc::new(Cell::new(true));
        self.live.borrow_mut().push(alive.clone());
        self.log.borrow_mut().push(Trace::Shown(token, display.id));
        Ok(Box::new(FakePresentation {
            token,
            alive,
            log: self.log.clone(),
        }))
    }
}

struct FakeBackend(Log);

impl NativeBackend for FakeBackend {
    fn surface_available(&self, surface: SurfaceRef) {
        self.0
            .borrow_mut()
            .push(Trace::Available(surface.as_ptr() as usize));
    }

    fn surface_removed(&self) {
        self.0.borrow_mut().push(Trace::Removed);
    }
}

struct FakeChrome(Log);

impl ChromeStyler for FakeChrome {
    fn apply(&mut self, target: ChromeTarget, _flags: SystemUiFlags) {
        self.0.borrow_mut().push(Trace::Chrome(target));
    }
}

struct FakeSink(Log);

impl EventSink for FakeSink {
    fn emit(&self, signal: Signal) {
        self.0.borrow_mut().push(Trace::Signal(signal));
    }
}

/// Fake platform around a shared display list
#[derive(Default)]
pub struct Rig {
    pub displays: DisplayList,
    log: Log,
    live: Rc<RefCell<Vec<Rc<Cell<bool>>>>>,
    fail_next: Rc<Cell<bool>>,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_displays(displays: Vec<Display>) -> Self {
        Self {
            displays: DisplayList::new(displays),
            ..Self::default()
        }
    }

    fn presenter(&self) -> Box<dyn Presenter> {
        Box::new(FakePresenter {
            log: self.log.clone(),
            live: self.live.clone(),
            fail_next: self.fail_next.clone(),
        })
    }

    pub fn bridge(&self) -> (SurfaceBridge, ScreenSession) {
        self.bridge_with_chrome(&ChromeConfig::default())
    }

    pub fn bridge_with_chrome(&self, config: &ChromeConfig) -> (SurfaceBridge, ScreenSession) {
        let bridge = SurfaceBridge::new(
            self.presenter(),
            Box::new(FakeBackend(self.log.clone())),
            Box::new(FakeChrome(self.log.clone())),
            config,
        );
        (bridge, ScreenSession::new())
    }

    pub fn controller(&self) -> (SessionController, ScreenSession, SurfaceBridge) {
        let (bridge, session) = self.bridge();
        let controller = SessionController::new(
            Box::new(self.displays.clone()),
            SelectionPolicy::default(),
            self.sink(),
        );
        (controller, session, bridge)
    }

    pub fn screen(&self, config: &Config) -> SecondScreen {
        let platform = Platform {
            registry: Box::new(self.displays.clone()),
            presenter: self.presenter(),
            backend: Box::new(FakeBackend(self.log.clone())),
            chrome: Box::new(FakeChrome(self.log.clone())),
            sink: self.sink(),
        };
        SecondScreen::new(platform, config)
    }

    pub fn sink(&self) -> Rc<dyn EventSink> {
        Rc::new(FakeSink(self.log.clone()))
    }

    /// Everything recorded so far, in order
    pub fn trace(&self) -> Vec<Trace> {
        self.log.borrow().clone()
    }

    /// Signals only
    pub fn signals(&self) -> Vec<Signal> {
        self.log
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Trace::Signal(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Platform tears down every window shown so far on its own
    pub fn kill_presentations(&self) {
        for alive in self.live.borrow().iter() {
            alive.set(false);
        }
    }

    /// Next `present` call fails
    pub fn fail_next_present(&self) {
        self.fail_next.set(true);
    }
}
