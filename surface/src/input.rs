//! Input model: pointer buttons and the caption drag state machine.
//!
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up. The surface tracks at most one gesture at a time: a single
//! pointer drags a single caption. The dragging variant carries the grab
//! context needed to recompute the caption position from the original
//! anchor on every move, so clamping never accumulates error.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::caption::CaptionId;
use crate::geom::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Internal state for the pointer state machine.
#[derive(Debug, Clone)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// The user is moving a caption across the surface.
    Dragging {
        /// Id of the caption being dragged.
        id: CaptionId,
        /// Pointer position at the start of the drag.
        start: Point,
        /// Caption position at the start of the drag.
        origin: Point,
    },
}

impl Default for InputState {
    fn default() -> Self {
        Self::Idle
    }
}

impl InputState {
    /// Whether a drag gesture is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}
