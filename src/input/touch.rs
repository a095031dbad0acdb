//! libinput touch source
//!
//! Reads touchscreen events from /dev/input/eventN through libinput and
//! assembles them into [`MotionEvent`]s with the same shape a platform
//! touch callback would deliver.

use anyhow::{anyhow, Result};
use input::event::touch::{TouchEventPosition, TouchEventSlot};
use input::event::{Event, EventTrait, TouchEvent};
use input::{Libinput, LibinputInterface};
use log::{debug, info, trace, warn};
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use std::path::Path;

#[cfg(feature = "seatd")]
use crate::session::SeatLifecycle;
#[cfg(feature = "seatd")]
use std::cell::RefCell;
#[cfg(feature = "seatd")]
use std::rc::Rc;

use super::{MotionEvent, Pointer, TouchAction};
use crate::config::InputConfig;

/// Slot-based touch state turned into platform-style motion events
///
/// Pointers keep the order they went down in; the pointer id is the
/// libinput seat slot.
#[derive(Debug, Default)]
pub struct TouchTracker {
    down: Vec<Pointer>,
    /// Motion seen since the last frame
    moved: bool,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointers currently down
    pub fn pointers(&self) -> &[Pointer] {
        &self.down
    }

    /// A finger touched down
    pub fn down(&mut self, id: i32, x: f32, y: f32) -> MotionEvent {
        // A stuck slot (missed up) is replaced, not duplicated
        self.down.retain(|p| p.id != id);
        self.down.push(Pointer::new(id, x, y));

        let action = if self.down.len() == 1 {
            TouchAction::Down
        } else {
            TouchAction::PointerDown
        };
        MotionEvent::new(action, self.down.len() - 1, self.down.clone())
    }

    /// A finger moved; reported on the next [`frame`](Self::frame)
    pub fn motion(&mut self, id: i32, x: f32, y: f32) {
        if let Some(p) = self.down.iter_mut().find(|p| p.id == id) {
            p.x = x;
            p.y = y;
            self.moved = true;
        }
    }

    /// End of a hardware frame: one move batch if anything moved
    pub fn frame(&mut self) -> Option<MotionEvent> {
        if !std::mem::take(&mut self.moved) || self.down.is_empty() {
            return None;
        }
        Some(MotionEvent::new(TouchAction::Move, 0, self.down.clone()))
    }

    /// A finger lifted, at its last known position
    pub fn up(&mut self, id: i32) -> Option<MotionEvent> {
        let index = self.down.iter().position(|p| p.id == id)?;
        let action = if self.down.len() == 1 {
            TouchAction::Up
        } else {
            TouchAction::PointerUp
        };
        let event = MotionEvent::new(action, index, self.down.clone());
        self.down.remove(index);
        Some(event)
    }

    /// Touch sequence cancelled (device grabbed, palm rejection)
    pub fn cancel(&mut self) -> Option<MotionEvent> {
        if self.down.is_empty() {
            return None;
        }
        self.moved = false;
        let event = MotionEvent::new(TouchAction::Cancel, 0, std::mem::take(&mut self.down));
        Some(event)
    }
}

/// LibinputInterface implementation for libinput
struct InputInterface;

impl LibinputInterface for InputInterface {
    fn open_restricted(&mut self, path: &Path, flags: i32) -> std::result::Result<OwnedFd, i32> {
        let f = OpenOptions::new()
            .read(true)
            .write((flags & libc::O_WRONLY != 0) || (flags & libc::O_RDWR != 0))
            .custom_flags(flags & !libc::O_WRONLY & !libc::O_RDWR & !libc::O_RDONLY)
            .open(path)
            .map_err(|e| {
                warn!("Cannot open device: {:?}: {}", path, e);
                e.raw_os_error().unwrap_or(-libc::ENOENT)
            })?;
        Ok(OwnedFd::from(f))
    }

    fn close_restricted(&mut self, fd: OwnedFd) {
        drop(fd);
    }
}

/// LibinputInterface implementation using libseat for device access
#[cfg(feature = "seatd")]
struct SeatInputInterface {
    seat: Rc<RefCell<SeatLifecycle>>,
}

#[cfg(feature = "seatd")]
impl LibinputInterface for SeatInputInterface {
    fn open_restricted(&mut self, path: &Path, _flags: i32) -> std::result::Result<OwnedFd, i32> {
        self.seat.borrow_mut().open_device(path).map_err(|e| {
            warn!("libseat: Cannot open device {:?}: {}", path, e);
            -libc::EACCES
        })
    }

    fn close_restricted(&mut self, fd: OwnedFd) {
        drop(fd);
    }
}

/// Touchscreen bound to the second display
pub struct LibinputTouchSource {
    input: Libinput,
    tracker: TouchTracker,
    /// Device name filter (empty = every touch device)
    device_filter: String,
    fd: RawFd,
}

impl LibinputTouchSource {
    /// Open every /dev/input/event* device directly (requires root or the
    /// input group)
    pub fn new(config: &InputConfig) -> Result<Self> {
        let input = Libinput::new_from_path(InputInterface);
        Self::from_libinput(input, config)
    }

    /// Open devices through the libseat session (no root required)
    #[cfg(feature = "seatd")]
    pub fn new_with_seat(config: &InputConfig, seat: Rc<RefCell<SeatLifecycle>>) -> Result<Self> {
        let input = Libinput::new_from_path(SeatInputInterface { seat });
        Self::from_libinput(input, config)
    }

    fn from_libinput(mut input: Libinput, config: &InputConfig) -> Result<Self> {
        // Scan and add devices from /dev/input/event*
        let mut device_count = 0;
        for entry in std::fs::read_dir("/dev/input")
            .map_err(|e| anyhow!("Cannot scan /dev/input: {}", e))?
        {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !name.starts_with("event") {
                continue;
            }
            let path_str = path.to_str().unwrap_or("");
            if input.path_add_device(path_str).is_some() {
                debug!("Input device added: {}", path_str);
                device_count += 1;
            }
        }

        if device_count == 0 {
            return Err(anyhow!(
                "No input devices found. Check permissions for /dev/input/event*."
            ));
        }

        let fd = input.as_raw_fd();

        // Set fd to non-blocking
        let flags = nix::fcntl::fcntl(fd, nix::fcntl::FcntlArg::F_GETFL)
            .map_err(|e| anyhow!("F_GETFL failed: {}", e))?;
        let mut flags = nix::fcntl::OFlag::from_bits_truncate(flags);
        flags.insert(nix::fcntl::OFlag::O_NONBLOCK);
        nix::fcntl::fcntl(fd, nix::fcntl::FcntlArg::F_SETFL(flags))
            .map_err(|e| anyhow!("F_SETFL failed: {}", e))?;

        info!(
            "touch: {} input devices added (filter={:?})",
            device_count, config.touch_device
        );

        Ok(Self {
            input,
            tracker: TouchTracker::new(),
            device_filter: config.touch_device.clone(),
            fd,
        })
    }

    /// Return libinput fd (for poll)
    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// Drain pending events into motion events
    ///
    /// `width`/`height` is the current surface size; touch coordinates are
    /// mapped onto it.
    pub fn dispatch(&mut self, width: u32, height: u32) -> Vec<MotionEvent> {
        let mut events = Vec::new();

        if let Err(e) = self.input.dispatch() {
            warn!("libinput dispatch error: {}", e);
            return events;
        }

        while let Some(event) = self.input.next() {
            if !self.device_filter.is_empty() {
                let device = event.device();
                if !device.name().contains(self.device_filter.as_str()) {
                    continue;
                }
            }

            let Event::Touch(touch) = event else {
                continue;
            };

            let produced = match touch {
                TouchEvent::Down(e) => Some(self.tracker.down(
                    e.seat_slot() as i32,
                    e.x_transformed(width) as f32,
                    e.y_transformed(height) as f32,
                )),
                TouchEvent::Motion(e) => {
                    self.tracker.motion(
                        e.seat_slot() as i32,
                        e.x_transformed(width) as f32,
                        e.y_transformed(height) as f32,
                    );
                    None
                }
                TouchEvent::Up(e) => self.tracker.up(e.seat_slot() as i32),
                TouchEvent::Cancel(_) => self.tracker.cancel(),
                TouchEvent::Frame(_) => self.tracker.frame(),
                other => {
                    trace!("Unhandled touch event: {:?}", other);
                    None
                }
            };
            events.extend(produced);
        }

        events
    }
}
