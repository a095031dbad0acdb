//! Display hotplug detection
//!
//! Monitors udev events for DRM connector changes (monitor plug/unplug)
//! so the session can pick up a second display that appears late.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::os::unix::io::{AsRawFd, RawFd};

use super::{Display, DisplayId, DisplayRegistry};
use crate::config::DisplayConfig;

/// Hotplug event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotplugEvent {
    /// A connector state changed (connect/disconnect/mode change)
    ConnectorChanged,
}

/// udev-based hotplug monitor for DRM devices
pub struct HotplugMonitor {
    socket: udev::MonitorSocket,
}

impl HotplugMonitor {
    /// Create a new hotplug monitor for DRM subsystem
    pub fn new() -> Result<Self> {
        let socket = udev::MonitorBuilder::new()
            .context("Failed to create udev monitor builder")?
            .match_subsystem("drm")
            .context("Failed to match drm subsystem")?
            .listen()
            .context("Failed to start udev monitor")?;

        info!("Display hotplug monitor initialized");
        Ok(Self { socket })
    }

    /// Monitor unless hotplug watching is disabled in the config
    pub fn from_config(config: &DisplayConfig) -> Result<Option<Self>> {
        if !config.watch_hotplug {
            info!("Display hotplug watching disabled");
            return Ok(None);
        }
        Self::new().map(Some)
    }

    /// Get the raw file descriptor for polling
    pub fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    /// Check for hotplug events (non-blocking)
    ///
    /// Drains every pending udev event and reports at most one change.
    pub fn poll(&mut self) -> Option<HotplugEvent> {
        let mut changed = None;
        for event in self.socket.iter() {
            let is_change = event.action().map(|a| a == "change").unwrap_or(false);
            let is_hotplug = event
                .property_value("HOTPLUG")
                .map(|v| v == "1")
                .unwrap_or(false);
            if is_change && is_hotplug {
                debug!("DRM hotplug event: {:?}", event.devpath().to_string_lossy());
                changed = Some(HotplugEvent::ConnectorChanged);
            }
        }
        changed
    }
}

/// Summary of display changes between two snapshots
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DisplayChanges {
    /// Displays that appeared
    pub connected: Vec<Display>,
    /// Displays that went away
    pub disconnected: Vec<Display>,
}

impl DisplayChanges {
    /// Returns true if any changes occurred
    pub fn has_changes(&self) -> bool {
        !self.connected.is_empty() || !self.disconnected.is_empty()
    }

    /// Check whether a specific display went away
    pub fn lost(&self, id: DisplayId) -> bool {
        self.disconnected.iter().any(|d| d.id == id)
    }

    /// Log the changes
    pub fn log(&self) {
        for display in &self.connected {
            info!("Display connected: {}", display);
        }
        for display in &self.disconnected {
            warn!("Display disconnected: {}", display);
        }
    }
}

/// Detect changes between two display snapshots
///
/// A display whose category flipped counts as removed and re-added, since
/// it changes what the selection policy sees.
pub fn detect_changes(old: &[Display], new: &[Display]) -> DisplayChanges {
    let mut changes = DisplayChanges::default();

    for display in new {
        match old.iter().find(|d| d.id == display.id) {
            Some(prev) if prev.category == display.category => {}
            Some(prev) => {
                changes.disconnected.push(prev.clone());
                changes.connected.push(display.clone());
            }
            None => changes.connected.push(display.clone()),
        }
    }

    for display in old {
        if !new.iter().any(|d| d.id == display.id) {
            changes.disconnected.push(display.clone());
        }
    }

    changes
}

/// Keeps the last display snapshot and reports what changed since
pub struct DisplayWatcher<R> {
    registry: R,
    last: Vec<Display>,
}

impl<R: DisplayRegistry> DisplayWatcher<R> {
    /// Start watching; the current state is the baseline
    pub fn new(registry: R) -> Self {
        let last = registry.all_displays().unwrap_or_else(|e| {
            debug!("Initial display snapshot failed: {}", e);
            Vec::new()
        });
        Self { registry, last }
    }

    /// Last snapshot taken
    pub fn displays(&self) -> &[Display] {
        &self.last
    }

    /// Take a new snapshot and diff it against the previous one
    ///
    /// An unavailable registry reads as "no displays".
    pub fn refresh(&mut self) -> DisplayChanges {
        let current = match self.registry.all_displays() {
            Ok(displays) => displays,
            Err(e) => {
                warn!("Display snapshot failed: {}", e);
                Vec::new()
            }
        };
        let changes = detect_changes(&self.last, &current);
        self.last = current;
        changes
    }

    /// Drain `monitor` and refresh if a connector changed
    pub fn poll(&mut self, monitor: &mut HotplugMonitor) -> Option<DisplayChanges> {
        monitor.poll()?;
        let changes = self.refresh();
        if !changes.has_changes() {
            return None;
        }
        changes.log();
        Some(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayCategory, DisplayList};

    fn builtin() -> Display {
        Display::new(0, "eDP-1", DisplayCategory::Default)
    }

    fn hdmi() -> Display {
        Display::new(77, "HDMI-A-1", DisplayCategory::Presentation)
    }

    #[test]
    fn test_no_changes() {
        let snap = vec![builtin(), hdmi()];
        assert!(!detect_changes(&snap, &snap).has_changes());
    }

    #[test]
    fn test_plug_and_unplug() {
        let plugged = detect_changes(&[builtin()], &[builtin(), hdmi()]);
        assert_eq!(plugged.connected, vec![hdmi()]);
        assert!(plugged.disconnected.is_empty());

        let unplugged = detect_changes(&[builtin(), hdmi()], &[builtin()]);
        assert!(unplugged.connected.is_empty());
        assert!(unplugged.lost(DisplayId(77)));
        assert!(!unplugged.lost(DisplayId(0)));
    }

    #[test]
    fn test_category_flip_is_replace() {
        let mut demoted = hdmi();
        demoted.category = DisplayCategory::Default;
        let changes = detect_changes(&[hdmi()], &[demoted.clone()]);
        assert_eq!(changes.connected, vec![demoted]);
        assert_eq!(changes.disconnected, vec![hdmi()]);
    }

    #[test]
    fn test_watcher_refresh() {
        let list = DisplayList::new(vec![builtin()]);
        let mut watcher = DisplayWatcher::new(list.clone());
        assert_eq!(watcher.displays(), &[builtin()]);
        assert!(!watcher.refresh().has_changes());

        list.set(vec![builtin(), hdmi()]);
        let changes = watcher.refresh();
        assert_eq!(changes.connected, vec![hdmi()]);
        assert!(!watcher.refresh().has_changes());

        list.set(Vec::new());
        let changes = watcher.refresh();
        assert_eq!(changes.disconnected.len(), 2);
    }

    #[test]
    fn test_monitor_disabled_by_config() {
        let config = DisplayConfig {
            watch_hotplug: false,
            ..DisplayConfig::default()
        };
        assert!(HotplugMonitor::from_config(&config).unwrap().is_none());
    }

    #[test]
    #[ignore]
    fn test_open_monitor() {
        // Requires udev (not available in most CI sandboxes)
        assert!(HotplugMonitor::new().is_ok());
    }
}
