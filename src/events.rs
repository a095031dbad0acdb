//! Signals delivered to the engine runtime
//!
//! The engine side owns dispatch; the bridge only hands each signal to an
//! [`EventSink`] in the order it happened.

use std::sync::mpsc;

use log::debug;

use crate::constants::{SIGNAL_CONNECTED, SIGNAL_DISCONNECTED, SIGNAL_INPUT};

/// Signal sent to the engine runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// A surface was created on the second display
    Connected,
    /// The surface on the second display was torn down
    Disconnected,
    /// One pointer sample from the second display
    Input {
        action: i32,
        x: f32,
        y: f32,
        pointer_id: i32,
    },
}

impl Signal {
    /// Engine-side signal name
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Connected => SIGNAL_CONNECTED,
            Signal::Disconnected => SIGNAL_DISCONNECTED,
            Signal::Input { .. } => SIGNAL_INPUT,
        }
    }
}

/// Engine-side receiver of signals
///
/// Called on the owning context. Implementations must not call back into
/// the bridge.
pub trait EventSink {
    fn emit(&self, signal: Signal);
}

/// Sink that forwards signals over a channel to the engine thread
pub struct ChannelSink {
    tx: mpsc::Sender<Signal>,
}

impl ChannelSink {
    /// Create the sink and the engine-side receiver
    pub fn new() -> (Self, mpsc::Receiver<Signal>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, signal: Signal) {
        if self.tx.send(signal).is_err() {
            debug!("Engine receiver gone, dropping {}", signal.name());
        }
    }
}
