//! Viewpoint handling
//!
//! The camera follows the viewer pose reported by the tracking session and
//! turns screen points into world-space rays for picking and dragging.

pub mod camera;

pub use camera::Camera;
