//! Marshalling onto the owning context
//!
//! Everything that touches the session runs on one context. Other threads
//! hold a [`ScreenHandle`] and post commands; the owner drains them with
//! [`SecondScreen::pump`](crate::SecondScreen::pump). Posting never blocks
//! and never reports a result: outcomes are only visible as signals.

use std::sync::mpsc::{self, Receiver, Sender};

use log::debug;

use crate::session::HostEvent;

/// Work posted to the owning context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    InitScreen,
    DestroyScreen,
    Host(HostEvent),
    DisplaysChanged,
}

/// Cloneable, thread-safe entry point into a [`SecondScreen`](crate::SecondScreen)
#[derive(Debug, Clone)]
pub struct ScreenHandle {
    tx: Sender<Command>,
}

impl ScreenHandle {
    /// Request the second screen
    pub fn init_screen(&self) {
        self.post(Command::InitScreen);
    }

    /// Withdraw the second screen
    pub fn destroy_screen(&self) {
        self.post(Command::DestroyScreen);
    }

    pub fn host_foregrounded(&self) {
        self.post(Command::Host(HostEvent::Foregrounded));
    }

    pub fn host_backgrounded(&self) {
        self.post(Command::Host(HostEvent::Backgrounded));
    }

    pub fn host_terminated(&self) {
        self.post(Command::Host(HostEvent::Terminated));
    }

    /// Display set changed (hotplug watcher on another thread)
    pub fn displays_changed(&self) {
        self.post(Command::DisplaysChanged);
    }

    fn post(&self, command: Command) {
        // Owner already gone: nothing left to act on
        if self.tx.send(command).is_err() {
            debug!("Second screen gone, dropping {:?}", command);
        }
    }
}

/// Owner side of the command channel
pub(crate) struct CommandQueue {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub(crate) fn handle(&self) -> ScreenHandle {
        ScreenHandle {
            tx: self.tx.clone(),
        }
    }

    /// Take every command posted so far, in posting order
    pub(crate) fn drain(&self) -> Vec<Command> {
        self.rx.try_iter().collect()
    }
}
