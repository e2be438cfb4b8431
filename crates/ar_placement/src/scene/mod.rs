//! Scene objects
//!
//! Geometry is loaded once per catalog item and shared read-only between the
//! preview and every placed instance. Each object owns its own pose and
//! material state.
//!
//! ```text
//! Catalog ── Arc<Geometry> ──┬── preview SceneObject (Material, Pose)
//!                            ├── placed SceneObject  (Material, Pose)
//!                            └── placed SceneObject  (Material, Pose)
//! ```

mod geometry;
mod object;

pub use geometry::{Geometry, GeometryPart};
pub use object::{Material, SceneObject};
