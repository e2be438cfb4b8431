//! Touch input
//!
//! Raw multi-touch events and the gesture state machine that turns them into
//! rotate, drag and scale operations on the selected object.

pub mod touch;
pub mod gesture;

pub use touch::{TouchEvent, TouchPhase, TouchPoint};
pub use gesture::{GestureContext, GestureEffect, GestureMode, GestureStateMachine};
