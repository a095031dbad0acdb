//! DRM/KMS display registry
//!
//! Enumerates connected DRM connectors and reports them as displays.
//! External connectors (HDMI, DP, DVI, VGA) are presentation displays;
//! the primary panel reports the default display id.

use anyhow::{anyhow, Context};
use drm::control::{connector, Device as ControlDevice, ModeTypeFlags};
use drm::Device as BasicDevice;
use log::{debug, trace};
use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, BorrowedFd};
use std::path::{Path, PathBuf};

use super::{Display, DisplayCategory, DisplayRegistry};
use crate::config::DisplayConfig;
use crate::constants::DEFAULT_DISPLAY_ID;
use crate::error::{Result, ScreenError};

/// Opened DRM card (control node)
struct Card(File);

// Trait implementations required by drm crate
impl AsFd for Card {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl BasicDevice for Card {}
impl ControlDevice for Card {}

impl Card {
    fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("Cannot open DRM device {}", path.display()))?;
        Ok(Self(file))
    }
}

/// Connected connector, reduced to what classification needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorSummary {
    /// Connector object id
    pub handle_id: u32,
    pub interface: connector::Interface,
    /// Per-interface index (the "1" in HDMI-A-1)
    pub interface_id: u32,
    /// Preferred mode size
    pub size: Option<(u32, u32)>,
}

impl ConnectorSummary {
    fn name(&self) -> String {
        format!("{}-{}", interface_name(self.interface), self.interface_id)
    }
}

/// Display registry reading connector state from a DRM card
///
/// Every query reopens the card and takes a fresh snapshot, so the result
/// always reflects the current hotplug state.
#[derive(Debug, Clone)]
pub struct DrmDisplayRegistry {
    path: PathBuf,
}

impl DrmDisplayRegistry {
    /// Registry over a specific card
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Registry over the configured card, or the first /dev/dri/card*
    pub fn from_config(config: &DisplayConfig) -> anyhow::Result<Self> {
        match &config.drm_device {
            Some(path) => Ok(Self::new(path.clone())),
            None => Ok(Self::new(find_drm_device()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of connected displays in connector order
    pub fn enumerate(&self) -> anyhow::Result<Vec<Display>> {
        let card = Card::open(&self.path)?;
        let resources = card
            .resource_handles()
            .context("Failed to get DRM resources")?;

        let mut connected = Vec::new();
        for &handle in resources.connectors() {
            let info = match card.get_connector(handle, false) {
                Ok(info) => info,
                Err(e) => {
                    debug!("Skipping connector {:?}: {}", handle, e);
                    continue;
                }
            };
            if info.state() != connector::State::Connected {
                continue;
            }

            let size = info
                .modes()
                .iter()
                .find(|m| m.mode_type().contains(ModeTypeFlags::PREFERRED))
                .or_else(|| info.modes().first())
                .map(|m| {
                    let (w, h) = m.size();
                    (w as u32, h as u32)
                });

            connected.push(ConnectorSummary {
                handle_id: u32::from(handle),
                interface: info.interface(),
                interface_id: info.interface_id(),
                size,
            });
        }

        trace!("{}: {} connected connectors", self.path.display(), connected.len());
        Ok(classify(&connected))
    }
}

impl DisplayRegistry for DrmDisplayRegistry {
    fn presentation_displays(&self) -> Result<Vec<Display>> {
        Ok(self
            .enumerate()
            .map_err(ScreenError::registry)?
            .into_iter()
            .filter(|d| d.is_presentation())
            .collect())
    }

    fn all_displays(&self) -> Result<Vec<Display>> {
        self.enumerate().map_err(ScreenError::registry)
    }
}

/// Turn connected connectors into displays
///
/// The primary display is the first internal panel, or the first connected
/// connector when there is none; it gets the default display id and is
/// never a presentation target.
pub fn classify(connected: &[ConnectorSummary]) -> Vec<Display> {
    let primary = connected
        .iter()
        .position(|c| is_internal_connector(c.interface))
        .or(if connected.is_empty() { None } else { Some(0) });

    connected
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let (id, category) = if Some(i) == primary {
                (DEFAULT_DISPLAY_ID, DisplayCategory::Default)
            } else if is_external_connector(c.interface) {
                (c.handle_id, DisplayCategory::Presentation)
            } else {
                (c.handle_id, DisplayCategory::Default)
            };
            let display = Display::new(id, c.name(), category);
            match c.size {
                Some((w, h)) => display.with_size(w, h),
                None => display,
            }
        })
        .collect()
}

/// Auto-detect DRM device
pub fn find_drm_device() -> anyhow::Result<PathBuf> {
    for i in 0..8 {
        let path = PathBuf::from(format!("/dev/dri/card{}", i));
        if path.exists() {
            return Ok(path);
        }
    }
    Err(anyhow!("/dev/dri/card* not found"))
}

/// Check if connector is external (not internal laptop display)
pub fn is_external_connector(interface: connector::Interface) -> bool {
    use connector::Interface;
    matches!(
        interface,
        Interface::HDMIA
            | Interface::HDMIB
            | Interface::DisplayPort
            | Interface::DVID
            | Interface::DVII
            | Interface::DVIA
            | Interface::VGA
    )
}

/// Check if connector is internal (built-in panel)
pub fn is_internal_connector(interface: connector::Interface) -> bool {
    use connector::Interface;
    matches!(
        interface,
        Interface::EmbeddedDisplayPort | Interface::LVDS | Interface::DSI
    )
}

/// Kernel-style connector type name
fn interface_name(interface: connector::Interface) -> &'static str {
    use connector::Interface;
    match interface {
        Interface::HDMIA => "HDMI-A",
        Interface::HDMIB => "HDMI-B",
        Interface::DisplayPort => "DP",
        Interface::DVID => "DVI-D",
        Interface::DVII => "DVI-I",
        Interface::DVIA => "DVI-A",
        Interface::VGA => "VGA",
        Interface::EmbeddedDisplayPort => "eDP",
        Interface::LVDS => "LVDS",
        Interface::DSI => "DSI",
        Interface::Virtual => "Virtual",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayId;
    use connector::Interface;

    fn conn(handle_id: u32, interface: Interface, interface_id: u32) -> ConnectorSummary {
        ConnectorSummary {
            handle_id,
            interface,
            interface_id,
            size: Some((1920, 1080)),
        }
    }

    #[test]
    fn test_dual_panel_handheld() {
        // Built-in DSI panel plus a second DSI panel underneath
        let displays = classify(&[conn(40, Interface::DSI, 1), conn(52, Interface::DSI, 2)]);
        assert_eq!(displays[0].id, DisplayId::DEFAULT);
        assert_eq!(displays[0].name, "DSI-1");
        assert_eq!(displays[1].id, DisplayId(52));
        assert_eq!(displays[1].category, DisplayCategory::Default);
    }

    #[test]
    fn test_external_is_presentation() {
        let displays = classify(&[conn(61, Interface::HDMIA, 1), conn(40, Interface::EmbeddedDisplayPort, 1)]);
        // eDP is primary even though HDMI enumerates first
        assert_eq!(displays[0].id, DisplayId(61));
        assert!(displays[0].is_presentation());
        assert_eq!(displays[1].id, DisplayId::DEFAULT);
        assert_eq!(displays[1].size, Some((1920, 1080)));
    }

    #[test]
    fn test_no_internal_panel() {
        let displays = classify(&[conn(61, Interface::HDMIA, 1), conn(70, Interface::DisplayPort, 1)]);
        assert_eq!(displays[0].id, DisplayId::DEFAULT);
        assert!(!displays[0].is_presentation());
        assert_eq!(displays[1].name, "DP-1");
        assert!(displays[1].is_presentation());
    }

    #[test]
    fn test_nothing_connected() {
        assert!(classify(&[]).is_empty());
    }

    #[test]
    #[ignore]
    fn test_enumerate_real_card() {
        // Requires /dev/dri access
        let registry = DrmDisplayRegistry::new(find_drm_device().unwrap());
        assert!(registry.all_displays().is_ok());
    }
}
