//! Touch input from the second display
//!
//! - [`MotionEvent`]: one platform touch callback (action + every pointer down)
//! - [`InputForwarder`]: fans events out into `second_screen_input` signals
//! - [`touch`]: libinput touch source producing motion events (Linux)

pub mod forwarder;
#[cfg(target_os = "linux")]
pub mod touch;

pub use forwarder::InputForwarder;
#[cfg(target_os = "linux")]
pub use touch::{LibinputTouchSource, TouchTracker};

use crate::constants::{
    ACTION_CANCEL, ACTION_DOWN, ACTION_MOVE, ACTION_OUTSIDE, ACTION_POINTER_DOWN,
    ACTION_POINTER_UP, ACTION_UP,
};

/// Masked touch action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Up,
    Move,
    Cancel,
    Outside,
    PointerDown,
    PointerUp,
    /// Platform action without a dedicated variant (hover, scroll, ...)
    Other(i32),
}

impl TouchAction {
    /// Map a platform action code
    pub fn from_code(code: i32) -> Self {
        match code {
            ACTION_DOWN => Self::Down,
            ACTION_UP => Self::Up,
            ACTION_MOVE => Self::Move,
            ACTION_CANCEL => Self::Cancel,
            ACTION_OUTSIDE => Self::Outside,
            ACTION_POINTER_DOWN => Self::PointerDown,
            ACTION_POINTER_UP => Self::PointerUp,
            other => Self::Other(other),
        }
    }

    /// Action code forwarded to the engine
    pub fn code(self) -> i32 {
        match self {
            Self::Down => ACTION_DOWN,
            Self::Up => ACTION_UP,
            Self::Move => ACTION_MOVE,
            Self::Cancel => ACTION_CANCEL,
            Self::Outside => ACTION_OUTSIDE,
            Self::PointerDown => ACTION_POINTER_DOWN,
            Self::PointerUp => ACTION_POINTER_UP,
            Self::Other(code) => code,
        }
    }
}

/// One pointer in surface pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: i32,
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub fn new(id: i32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// Raw touch callback from the capture surface
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    pub action: TouchAction,
    /// Index into `pointers` of the pointer that triggered the action
    pub action_index: usize,
    /// Every pointer currently down, in platform order
    pub pointers: Vec<Pointer>,
}

impl MotionEvent {
    pub fn new(action: TouchAction, action_index: usize, pointers: Vec<Pointer>) -> Self {
        Self {
            action,
            action_index,
            pointers,
        }
    }

    /// Pointer that triggered the action
    pub fn action_pointer(&self) -> Option<&Pointer> {
        self.pointers.get(self.action_index)
    }
}
