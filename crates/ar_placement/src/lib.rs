//! # AR Placement
//!
//! Surface-anchored placement and multi-touch manipulation engine for
//! previewing furniture models in a live camera feed.
//!
//! ## Features
//!
//! - **Surface Tracking**: Lazy hit-test source acquisition, one surface sample per frame
//! - **Preview Lifecycle**: Show, confirm and cancel a semi-transparent preview object
//! - **Gestures**: One-finger yaw rotation, two-finger drag and pinch scale with hysteresis
//! - **Selection**: Ray picking against placed objects with a single highlighted selection
//! - **Catalog**: Structured `(category, name)` lookup with ordered fallback loading
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ar_placement::prelude::*;
//!
//! fn run(
//!     tracking: &mut dyn TrackingSession,
//!     renderer: &mut dyn RenderSurface,
//!     catalog: &Catalog,
//! ) -> Result<(), SessionError> {
//!     let mut session = ArSession::new(SessionConfig::default())?;
//!     let key = CatalogKey::new("lamp", "lamp1");
//!     session.handle_action(UiAction::ShowItem(key), catalog)?;
//!
//!     // Once per rendered frame:
//!     session.frame(tracking, renderer);
//!
//!     // When the user taps "Place":
//!     session.handle_action(UiAction::Confirm, catalog)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod spatial;
pub mod view;
pub mod scene;
pub mod catalog;
pub mod tracking;
pub mod selection;
pub mod input;
pub mod placement;
pub mod events;
pub mod render;
pub mod session;

#[cfg(test)]
mod tests;

pub use session::{ArSession, SessionError, UiAction};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        ArSession, SessionError, UiAction,
        catalog::{Catalog, CatalogEntry, CatalogItem, CatalogKey, FallbackLoader, LoadStrategy, ModelSource, AssetError},
        config::{Config, ConfigError, SessionConfig, GestureConfig, PlacementConfig, EmptyTapPolicy},
        events::{SessionEvent, SessionEventHandler, SessionEventKind},
        foundation::math::{Pose, Vec2, Vec3, Mat4, Quat},
        foundation::collections::ObjectId,
        input::{GestureMode, TouchEvent, TouchPhase, TouchPoint},
        placement::{PlacementError, PlacementStatus},
        render::{RenderFrame, RenderSurface},
        scene::{Geometry, GeometryPart, Material, SceneObject},
        tracking::{HitTestResult, HitTestSourceId, SourceStatus, SurfaceSample, TrackingError, TrackingSession},
    };
}
