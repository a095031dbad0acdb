//! libseat host lifecycle source
//!
//! On a bare console the "host in foreground" question is answered by the
//! seat: enable means our VT is active, disable means the user switched
//! away. The seat also grants rootless access to the touch device.

use std::cell::Cell;
use std::os::fd::{AsFd, AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc;

use anyhow::{Context, Result};
use libseat::{Seat, SeatEvent, SeatRef};
use log::{debug, info, warn};

use super::HostEvent;

/// Host lifecycle events from a libseat session
pub struct SeatLifecycle {
    seat: Seat,
    /// Seat currently enabled (written from the libseat callback)
    enabled: Rc<Cell<bool>>,
    events: mpsc::Receiver<HostEvent>,
}

impl SeatLifecycle {
    /// Open the seat; the first `Foregrounded` arrives once it is enabled
    pub fn open() -> Result<Self> {
        let (tx, events) = mpsc::channel();
        let enabled = Rc::new(Cell::new(false));
        let flag = enabled.clone();

        let mut seat = Seat::open(move |seat_ref: &mut SeatRef, event: SeatEvent| {
            let host_event = match event {
                SeatEvent::Enable => {
                    info!("libseat: session enabled");
                    flag.set(true);
                    HostEvent::Foregrounded
                }
                SeatEvent::Disable => {
                    info!("libseat: session disabled");
                    flag.set(false);
                    // Must call disable() to acknowledge
                    if let Err(e) = seat_ref.disable() {
                        warn!("libseat: failed to disable seat: {}", e);
                    }
                    HostEvent::Backgrounded
                }
            };
            let _ = tx.send(host_event);
        })
        .context("Failed to open libseat session")?;

        info!("libseat: opened seat '{}'", seat.name());

        Ok(Self {
            seat,
            enabled,
            events,
        })
    }

    /// Seat is enabled (our VT is in front)
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Get pollable file descriptor for event loop integration
    pub fn get_fd(&mut self) -> Result<RawFd> {
        let borrowed_fd = self.seat.get_fd().context("Failed to get seat fd")?;
        Ok(borrowed_fd.as_raw_fd())
    }

    /// Dispatch pending seat events and return the resulting host events
    /// (call when the fd is readable)
    pub fn pump(&mut self) -> Result<Vec<HostEvent>> {
        self.seat
            .dispatch(0)
            .context("Failed to dispatch seat events")?;
        Ok(self.events.try_iter().collect())
    }

    /// Open an input device through the seat
    ///
    /// The returned fd is a duplicate owned by the caller; it stops
    /// delivering events while the seat is disabled.
    pub fn open_device<P: AsRef<Path>>(&mut self, path: P) -> Result<OwnedFd> {
        let path = path.as_ref();
        let device = self
            .seat
            .open_device(&path)
            .with_context(|| format!("Failed to open device: {}", path.display()))?;
        let raw_fd = device.as_fd().as_raw_fd();
        debug!("libseat: opened device {} (fd={})", path.display(), raw_fd);

        let dup_fd = nix::unistd::dup(raw_fd).context("Failed to dup device fd")?;
        Ok(unsafe { OwnedFd::from_raw_fd(dup_fd) })
    }
}

impl Drop for SeatLifecycle {
    fn drop(&mut self) {
        info!("libseat: closing session");
    }
}
