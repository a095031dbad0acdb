//! Touch event forwarding
//!
//! Move batches fan out into one sample per pointer with the fixed move
//! code; every other action forwards only its action-index pointer with
//! the action's own code. Coordinates stay in surface pixels.

use std::rc::Rc;

use log::{debug, trace};

use super::{MotionEvent, Pointer, TouchAction};
use crate::constants::ACTION_MOVE;
use crate::events::{EventSink, Signal};

/// Forwards second display touch events to the engine
pub struct InputForwarder {
    sink: Rc<dyn EventSink>,
}

impl InputForwarder {
    pub fn new(sink: Rc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Forward one touch callback
    ///
    /// Always returns true: the capture surface consumes every event.
    pub fn forward(&self, event: &MotionEvent) -> bool {
        match event.action {
            TouchAction::Move => {
                for pointer in &event.pointers {
                    self.emit(ACTION_MOVE, pointer);
                }
            }
            action => match event.action_pointer() {
                Some(pointer) => self.emit(action.code(), pointer),
                None => debug!(
                    "Dropping {:?}: action index {} out of {} pointers",
                    action,
                    event.action_index,
                    event.pointers.len()
                ),
            },
        }
        true
    }

    fn emit(&self, action: i32, pointer: &Pointer) {
        trace!(
            "input action={} id={} ({}, {})",
            action,
            pointer.id,
            pointer.x,
            pointer.y
        );
        self.sink.emit(Signal::Input {
            action,
            x: pointer.x,
            y: pointer.y,
            pointer_id: pointer.id,
        });
    }
}
