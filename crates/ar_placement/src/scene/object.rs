//! Preview and placed object state

use std::sync::Arc;

use crate::catalog::CatalogKey;
use crate::foundation::math::{Mat4, Pose};

use super::Geometry;

/// Per-object rendering state
///
/// Never shared: cloning a [`SceneObject`] copies this by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    opacity: f32,
}

impl Material {
    /// Create a material with the given opacity, clamped to [0, 1]
    pub fn with_opacity(opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Current opacity
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether the renderer must blend this object
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::with_opacity(1.0)
    }
}

/// A model instance in the scene
///
/// Cloning shares the geometry and copies pose and material, which gives
/// each placed object independent visual state.
#[derive(Debug, Clone)]
pub struct SceneObject {
    item: CatalogKey,
    geometry: Arc<Geometry>,
    /// World pose including uniform scale
    pub pose: Pose,
    material: Material,
    visible: bool,
}

impl SceneObject {
    /// Create a visible object at the identity pose
    pub fn new(item: CatalogKey, geometry: Arc<Geometry>, opacity: f32) -> Self {
        Self {
            item,
            geometry,
            pose: Pose::identity(),
            material: Material::with_opacity(opacity),
            visible: true,
        }
    }

    /// Catalog item this object was created from
    pub fn item(&self) -> &CatalogKey {
        &self.item
    }

    /// Shared geometry
    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    /// Material state
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Current opacity
    pub fn opacity(&self) -> f32 {
        self.material.opacity()
    }

    /// Replace the opacity, clamped to [0, 1]
    pub fn set_opacity(&mut self, opacity: f32) {
        self.material = Material::with_opacity(opacity);
    }

    /// Whether the object should be drawn
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the object
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Uniform scale
    pub fn scale(&self) -> f32 {
        self.pose.scale
    }

    /// Set uniform scale on all three axes
    pub fn set_scale(&mut self, scale: f32) {
        self.pose.scale = scale;
    }

    /// Rotate about the world Y axis
    pub fn rotate_yaw(&mut self, angle: f32) {
        self.pose.rotate_yaw(angle);
    }

    /// Move within the horizontal plane; height is untouched
    pub fn translate_horizontal(&mut self, dx: f32, dz: f32) {
        self.pose.position.x += dx;
        self.pose.position.z += dz;
    }

    /// Model-to-world matrix
    pub fn model_matrix(&self) -> Mat4 {
        self.pose.to_matrix()
    }
}
