//! Multi-touch events
//!
//! Events carry the set of touches still on the screen *after* the event,
//! so a touch-end that lifts the last finger has an empty touch list.

use crate::foundation::math::{utils, Vec2};

/// One finger on the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Platform touch identifier, stable for the lifetime of the touch
    pub id: u64,
    /// Position in device pixels, origin top-left
    pub position: Vec2,
}

impl TouchPoint {
    /// Create a touch point
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
        }
    }
}

/// What happened to the touch set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// A finger touched down
    Start,
    /// One or more fingers moved
    Move,
    /// A finger lifted
    End,
    /// The platform cancelled one or more touches
    Cancel,
}

/// A touch event with the touches active after it
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    /// Event phase
    pub phase: TouchPhase,
    /// Touches still down after this event
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Create an event
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }

    /// Touch-start event
    pub fn start(touches: Vec<TouchPoint>) -> Self {
        Self::new(TouchPhase::Start, touches)
    }

    /// Touch-move event
    pub fn moved(touches: Vec<TouchPoint>) -> Self {
        Self::new(TouchPhase::Move, touches)
    }

    /// Touch-end event
    pub fn end(touches: Vec<TouchPoint>) -> Self {
        Self::new(TouchPhase::End, touches)
    }

    /// Number of touches still down
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    /// Midpoint of the first two touches
    pub fn centroid(&self) -> Option<Vec2> {
        match self.touches.as_slice() {
            [a, b, ..] => Some(utils::midpoint(a.position, b.position)),
            _ => None,
        }
    }

    /// Distance between the first two touches
    pub fn spread(&self) -> Option<f32> {
        match self.touches.as_slice() {
            [a, b, ..] => Some((a.position - b.position).norm()),
            _ => None,
        }
    }
}
