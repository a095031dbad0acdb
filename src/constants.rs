//! Global constants for secondscreen
//!
//! Consolidates signal names, action codes and display identifiers
//! to eliminate magic numbers throughout the codebase.

// ============================================================================
// Signal Names
// ============================================================================

/// Emitted after a surface was created on the second display
pub const SIGNAL_CONNECTED: &str = "second_screen_connected";

/// Emitted after the live surface was torn down
pub const SIGNAL_DISCONNECTED: &str = "second_screen_disconnected";

/// Emitted per forwarded pointer sample: (action, x, y, pointer id)
pub const SIGNAL_INPUT: &str = "second_screen_input";

// ============================================================================
// Touch Action Codes
// ============================================================================
//
// Numeric values match the masked action codes engine-side consumers
// already switch on, so they are part of the wire contract.

/// First pointer went down
pub const ACTION_DOWN: i32 = 0;

/// Last pointer went up
pub const ACTION_UP: i32 = 1;

/// Fixed code for every fanned-out move sample
pub const ACTION_MOVE: i32 = 2;

/// Gesture aborted
pub const ACTION_CANCEL: i32 = 3;

/// Touch landed outside the capture region
pub const ACTION_OUTSIDE: i32 = 4;

/// Additional pointer went down
pub const ACTION_POINTER_DOWN: i32 = 5;

/// Non-last pointer went up
pub const ACTION_POINTER_UP: i32 = 6;

// ============================================================================
// Display Identifiers
// ============================================================================

/// Identifier of the primary (built-in) display
pub const DEFAULT_DISPLAY_ID: u32 = 0;

// ============================================================================
// Configuration
// ============================================================================

/// Application directory name under the config dirs
pub const CONFIG_DIR_NAME: &str = "secondscreen";

/// System-wide config path
pub const SYSTEM_CONFIG_PATH: &str = "/etc/secondscreen/config.toml";

/// Default log filter when none is configured
pub const DEFAULT_LOG_FILTER: &str = "warn";
