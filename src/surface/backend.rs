//! Native window slot
//!
//! Receiving end of the surface notifications for renderers that live on
//! another thread. The slot holds at most one window; the generation
//! counter lets a renderer notice that its target changed underneath it
//! and rebuild its swapchain.

use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use super::{NativeBackend, SurfaceRef};

#[derive(Debug, Default)]
struct SlotState {
    surface: Option<SurfaceRef>,
    generation: u64,
}

/// Process-shared slot holding the current second display window
#[derive(Debug, Clone, Default)]
pub struct WindowSlot {
    state: Arc<Mutex<SlotState>>,
}

impl WindowSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // A panicking renderer must not take the bridge down with it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current window, if one is attached
    pub fn current(&self) -> Option<SurfaceRef> {
        self.lock().surface
    }

    pub fn is_available(&self) -> bool {
        self.lock().surface.is_some()
    }

    /// Window size in pixels, (0, 0) when detached
    pub fn size(&self) -> (u32, u32) {
        self.lock().surface.map(|s| s.size()).unwrap_or((0, 0))
    }

    /// Bumped on every attach and detach
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }
}

impl NativeBackend for WindowSlot {
    fn surface_available(&self, surface: SurfaceRef) {
        let mut state = self.lock();
        if state.surface.is_some() {
            debug!("Window slot: replacing window without prior removal");
        }
        state.surface = Some(surface);
        state.generation += 1;
    }

    fn surface_removed(&self) {
        let mut state = self.lock();
        if state.surface.take().is_some() {
            state.generation += 1;
        }
    }
}
