//! Preview lifecycle
//!
//! [`PlacementController`] owns the single preview object. Each frame it
//! mirrors the latest surface sample; on confirm it hands an independent
//! copy to the [`SelectionRegistry`] and discards the preview.
//!
//! A preview is created hidden unless a surface is already known, and is
//! hidden again whenever the surface is lost.

use thiserror::Error;

use crate::catalog::CatalogItem;
use crate::config::PlacementConfig;
use crate::foundation::collections::ObjectId;
use crate::foundation::math::Pose;
use crate::scene::SceneObject;
use crate::selection::SelectionRegistry;
use crate::tracking::SurfaceSample;

/// Reasons a confirm did nothing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// No preview to place
    #[error("No model selected for placement")]
    NoPreview,

    /// No surface under the reticle
    #[error("No surface detected")]
    NoSurface,
}

/// User-facing placement guidance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementStatus {
    /// Nothing to place
    #[default]
    Idle,
    /// Preview shown, waiting for a surface
    SearchingSurface,
    /// Preview anchored to a surface
    ReadyToPlace,
    /// The last confirm placed an object
    Placed,
    /// Confirm was asked for with no model chosen
    NoModel,
}

impl PlacementStatus {
    /// Guidance text for the status line
    pub fn message(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::SearchingSurface => "Point at a surface to place the model",
            Self::ReadyToPlace => "Tap 'Place' to position the model",
            Self::Placed => "Model placed",
            Self::NoModel => "Select a model to place",
        }
    }
}

/// Owner of the preview object
#[derive(Debug)]
pub struct PlacementController {
    preview: Option<SceneObject>,
    latest: SurfaceSample,
    status: PlacementStatus,
    preview_opacity: f32,
    placed_opacity: f32,
}

impl PlacementController {
    /// Create a controller with no preview
    pub fn new(config: &PlacementConfig) -> Self {
        Self {
            preview: None,
            latest: SurfaceSample::invalid(),
            status: PlacementStatus::Idle,
            preview_opacity: config.preview_opacity,
            placed_opacity: config.placed_opacity,
        }
    }

    /// Replace any preview with a new one for `item`
    pub fn show_preview(&mut self, item: &CatalogItem) {
        if let Some(previous) = self.preview.take() {
            log::debug!("Discarding preview of {}", previous.item());
        }

        let mut preview = SceneObject::new(item.key.clone(), item.geometry.clone(), self.preview_opacity);
        Self::track(&mut preview, &self.latest);
        self.preview = Some(preview);
        self.refresh_status();
        log::info!("Showing preview of {}", item.key);
    }

    /// Mirror this frame's surface sample onto the preview
    pub fn update_preview(&mut self, sample: SurfaceSample) {
        self.latest = sample;
        if let Some(preview) = self.preview.as_mut() {
            Self::track(preview, &sample);
        }
        self.refresh_status();
    }

    fn track(preview: &mut SceneObject, sample: &SurfaceSample) {
        if sample.valid {
            preview.pose.anchor_to(&sample.pose);
        }
        preview.set_visible(sample.valid);
    }

    fn refresh_status(&mut self) {
        self.status = match (&self.preview, self.latest.valid) {
            (Some(_), true) => PlacementStatus::ReadyToPlace,
            (Some(_), false) => PlacementStatus::SearchingSurface,
            (None, _) if matches!(self.status, PlacementStatus::Placed | PlacementStatus::NoModel) => self.status,
            (None, _) => PlacementStatus::Idle,
        };
    }

    /// Place a copy of the preview on the current surface
    ///
    /// On failure nothing is placed and the preview is left as it was.
    pub fn confirm(&mut self, registry: &mut SelectionRegistry) -> Result<ObjectId, PlacementError> {
        let Some(preview) = self.preview.as_ref() else {
            log::warn!("Confirm ignored: {}", PlacementError::NoPreview);
            self.status = PlacementStatus::NoModel;
            return Err(PlacementError::NoPreview);
        };
        let Some(surface) = self.latest.pose() else {
            log::warn!("Confirm ignored: {}", PlacementError::NoSurface);
            self.status = PlacementStatus::SearchingSurface;
            return Err(PlacementError::NoSurface);
        };

        let mut placed = preview.clone();
        placed.set_opacity(self.placed_opacity);
        placed.pose.anchor_to(&surface);
        placed.set_visible(true);
        let item = placed.item().clone();
        let id = registry.place(placed);

        self.preview = None;
        self.status = PlacementStatus::Placed;
        log::info!("Placed {item} as {id:?}");
        Ok(id)
    }

    /// Discard the preview
    ///
    /// Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        let Some(preview) = self.preview.take() else {
            return false;
        };
        self.status = PlacementStatus::Idle;
        log::info!("Cancelled preview of {}", preview.item());
        true
    }

    /// The preview, visible or not
    pub fn preview(&self) -> Option<&SceneObject> {
        self.preview.as_ref()
    }

    /// The preview if it should be rendered this frame
    pub fn visible_preview(&self) -> Option<&SceneObject> {
        self.preview.as_ref().filter(|preview| preview.is_visible())
    }

    /// Whether a preview exists
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Latest surface sample
    pub fn latest(&self) -> SurfaceSample {
        self.latest
    }

    /// Reticle pose, shown only while a surface is detected
    pub fn reticle(&self) -> Option<Pose> {
        self.latest.pose()
    }

    /// Current guidance status
    pub fn status(&self) -> PlacementStatus {
        self.status
    }
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::new(&PlacementConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::catalog::CatalogKey;
    use crate::foundation::math::{Quat, Vec3};
    use crate::scene::Geometry;
    use approx::assert_relative_eq;

    fn item(name: &str) -> CatalogItem {
        CatalogItem {
            key: CatalogKey::new("lamp", name),
            height: 0.3,
            geometry: Arc::new(Geometry::unit_box(name)),
        }
    }

    fn surface_at(x: f32) -> SurfaceSample {
        SurfaceSample::detected(Pose::new(Vec3::new(x, 0.0, -1.0), Quat::from_axis_angle(&Vec3::y_axis(), 0.5)))
    }

    #[test]
    fn test_preview_hidden_until_surface() {
        let mut controller = PlacementController::default();
        controller.show_preview(&item("lamp1"));

        assert!(controller.visible_preview().is_none());
        assert_eq!(controller.status(), PlacementStatus::SearchingSurface);

        controller.update_preview(surface_at(0.5));
        let preview = controller.visible_preview().unwrap();
        assert_relative_eq!(preview.pose.position, Vec3::new(0.5, 0.0, -1.0));
        assert_relative_eq!(preview.opacity(), 0.5);
        assert_eq!(controller.status(), PlacementStatus::ReadyToPlace);

        controller.update_preview(SurfaceSample::invalid());
        assert!(controller.visible_preview().is_none());
        assert!(controller.reticle().is_none());
    }

    #[test]
    fn test_show_preview_replaces_previous() {
        let mut controller = PlacementController::default();
        controller.show_preview(&item("lamp1"));
        controller.show_preview(&item("lamp2"));
        assert_eq!(controller.preview().unwrap().item().name, "lamp2");
    }

    #[test]
    fn test_confirm_without_surface_changes_nothing() {
        let mut controller = PlacementController::default();
        let mut registry = SelectionRegistry::default();
        assert_eq!(controller.confirm(&mut registry), Err(PlacementError::NoPreview));
        assert_eq!(controller.status(), PlacementStatus::NoModel);

        controller.show_preview(&item("lamp1"));
        controller.update_preview(SurfaceSample::invalid());
        assert_eq!(controller.confirm(&mut registry), Err(PlacementError::NoSurface));

        assert!(registry.is_empty());
        assert!(controller.has_preview());
        assert_eq!(controller.status().message(), "Point at a surface to place the model");
    }

    #[test]
    fn test_confirm_places_opaque_copy() {
        let mut controller = PlacementController::default();
        let mut registry = SelectionRegistry::default();
        controller.show_preview(&item("lamp1"));
        controller.update_preview(surface_at(1.0));

        let id = controller.confirm(&mut registry).unwrap();
        let placed = registry.get(id).unwrap();

        assert_relative_eq!(placed.opacity(), 1.0);
        assert_relative_eq!(placed.pose.position, Vec3::new(1.0, 0.0, -1.0));
        assert!(!controller.has_preview());
        assert_eq!(controller.status(), PlacementStatus::Placed);

        controller.update_preview(surface_at(2.0));
        assert_eq!(controller.status().message(), "Model placed");
    }

    #[test]
    fn test_cancel_leaves_no_trace() {
        let mut controller = PlacementController::default();
        let registry = SelectionRegistry::default();
        controller.show_preview(&item("lamp1"));

        assert!(controller.cancel());
        assert!(!controller.cancel());
        assert!(registry.is_empty());
        assert_eq!(controller.status(), PlacementStatus::Idle);
    }

    #[test]
    fn test_confirm_after_placing_asks_for_model() {
        let mut controller = PlacementController::default();
        let mut registry = SelectionRegistry::default();
        controller.show_preview(&item("lamp1"));
        controller.update_preview(surface_at(0.0));
        controller.confirm(&mut registry).unwrap();

        assert_eq!(controller.confirm(&mut registry), Err(PlacementError::NoPreview));
        assert_eq!(controller.status(), PlacementStatus::NoModel);
        assert_eq!(controller.status().message(), "Select a model to place");
        assert_eq!(registry.len(), 1);

        controller.update_preview(surface_at(1.0));
        assert_eq!(controller.status(), PlacementStatus::NoModel);

        controller.show_preview(&item("lamp2"));
        assert_eq!(controller.status(), PlacementStatus::ReadyToPlace);
    }
}
