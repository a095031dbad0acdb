//! Display discovery and target selection
//!
//! The registry itself belongs to the platform; this module only defines
//! what the bridge needs from it and the policy for picking the display
//! the presentation goes to.

#[cfg(target_os = "linux")]
pub mod hotplug;
#[cfg(target_os = "linux")]
pub mod kms;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::config::DisplayConfig;
use crate::constants::DEFAULT_DISPLAY_ID;
use crate::error::Result;

#[cfg(target_os = "linux")]
pub use hotplug::{detect_changes, DisplayChanges, DisplayWatcher, HotplugEvent, HotplugMonitor};
#[cfg(target_os = "linux")]
pub use kms::DrmDisplayRegistry;

/// Platform display identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u32);

impl DisplayId {
    /// The primary display the host itself renders to
    pub const DEFAULT: DisplayId = DisplayId(DEFAULT_DISPLAY_ID);

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display category as reported by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCategory {
    /// Suitable for showing a presentation (external monitor, cast target)
    Presentation,
    /// Any other display, including the primary one
    Default,
}

/// Immutable display snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub id: DisplayId,
    /// Human readable name (connector name, platform label)
    pub name: String,
    pub category: DisplayCategory,
    /// Native size in pixels, if known
    pub size: Option<(u32, u32)>,
}

impl Display {
    pub fn new(id: u32, name: impl Into<String>, category: DisplayCategory) -> Self {
        Self {
            id: DisplayId(id),
            name: name.into(),
            category,
            size: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn is_presentation(&self) -> bool {
        self.category == DisplayCategory::Presentation
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size {
            Some((w, h)) => write!(f, "#{} {} ({}x{})", self.id, self.name, w, h),
            None => write!(f, "#{} {}", self.id, self.name),
        }
    }
}

/// Source of display snapshots
///
/// Both lists are in the platform's enumeration order. An `Err` means the
/// display service itself is unavailable, which callers treat the same as
/// "no displays".
pub trait DisplayRegistry {
    /// Displays in the presentation category
    fn presentation_displays(&self) -> Result<Vec<Display>>;

    /// Every display, the default one included
    fn all_displays(&self) -> Result<Vec<Display>>;
}

/// Target selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Accept a non-presentation secondary display when no presentation
    /// display exists
    pub fallback_to_secondary: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            fallback_to_secondary: true,
        }
    }
}

impl From<&DisplayConfig> for SelectionPolicy {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            fallback_to_secondary: config.fallback_to_secondary,
        }
    }
}

/// Pick the display the presentation should go to
///
/// First presentation display in enumeration order, else (if allowed) the
/// first display that is not the default one. `Ok(None)` is the normal
/// "no second display" answer.
pub fn select_target(
    registry: &dyn DisplayRegistry,
    policy: SelectionPolicy,
) -> Result<Option<Display>> {
    if let Some(display) = registry.presentation_displays()?.into_iter().next() {
        debug!("Presentation display available: {}", display);
        return Ok(Some(display));
    }

    if !policy.fallback_to_secondary {
        return Ok(None);
    }

    let fallback = registry
        .all_displays()?
        .into_iter()
        .find(|d| !d.id.is_default());
    if let Some(display) = &fallback {
        debug!("No presentation display, falling back to {}", display);
    }
    Ok(fallback)
}

/// Registry backed by a list the platform shim keeps up to date
///
/// Clones share the same list, so the shim can hold one handle and push
/// new snapshots while the session controller reads through another.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    displays: Rc<RefCell<Vec<Display>>>,
}

impl DisplayList {
    pub fn new(displays: Vec<Display>) -> Self {
        Self {
            displays: Rc::new(RefCell::new(displays)),
        }
    }

    /// Replace the snapshot
    pub fn set(&self, displays: Vec<Display>) {
        *self.displays.borrow_mut() = displays;
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Vec<Display> {
        self.displays.borrow().clone()
    }
}

impl DisplayRegistry for DisplayList {
    fn presentation_displays(&self) -> Result<Vec<Display>> {
        Ok(self
            .displays
            .borrow()
            .iter()
            .filter(|d| d.is_presentation())
            .cloned()
            .collect())
    }

    fn all_displays(&self) -> Result<Vec<Display>> {
        Ok(self.snapshot())
    }
}
