//! Shared model geometry
//!
//! Only what picking and layout need is kept: named parts with local
//! axis-aligned bounds. Vertex data stays with the renderer.

use crate::catalog::AssetError;
use crate::foundation::math::Vec3;
use crate::spatial::Aabb;

/// Heights at or below this cannot be normalized
const MIN_HEIGHT: f32 = 1e-6;

/// One pickable sub-part of a model
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPart {
    /// Part name from the source asset
    pub name: String,
    /// Local-space bounds
    pub bounds: Aabb,
}

impl GeometryPart {
    /// Create a named part
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }
}

/// Read-only model geometry made of one or more parts
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Model name
    pub name: String,
    parts: Vec<GeometryPart>,
}

impl Geometry {
    /// Create geometry from parts
    ///
    /// Fails when there are no parts or any part has non-finite bounds.
    pub fn new(name: impl Into<String>, parts: Vec<GeometryPart>) -> Result<Self, AssetError> {
        let name = name.into();
        if parts.is_empty() {
            return Err(AssetError::InvalidGeometry(format!("'{name}' has no parts")));
        }
        let finite = |v: &Vec3| v.iter().all(|c| c.is_finite());
        if let Some(part) = parts.iter().find(|p| !finite(&p.bounds.min) || !finite(&p.bounds.max)) {
            return Err(AssetError::InvalidGeometry(format!(
                "part '{}' of '{name}' has non-finite bounds",
                part.name
            )));
        }
        Ok(Self { name, parts })
    }

    /// Axis-aligned unit cube centred on the origin, used as a stand-in model
    pub fn unit_box(name: impl Into<String>) -> Self {
        let name = name.into();
        let part = GeometryPart::new(
            name.clone(),
            Aabb::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5)),
        );
        Self {
            name,
            parts: vec![part],
        }
    }

    /// Model parts
    pub fn parts(&self) -> &[GeometryPart] {
        &self.parts
    }

    /// Bounds enclosing every part
    pub fn bounds(&self) -> Aabb {
        self.parts
            .iter()
            .skip(1)
            .fold(self.parts[0].bounds, |bounds, part| bounds.union(&part.bounds))
    }

    /// Uniformly rescale so the model is `height` tall, then recentre on the origin
    pub fn normalized(&self, height: f32) -> Result<Self, AssetError> {
        if !(height.is_finite() && height > 0.0) {
            return Err(AssetError::InvalidGeometry(format!(
                "target height {height} for '{}' must be positive",
                self.name
            )));
        }

        let bounds = self.bounds();
        let current = bounds.size().y;
        if !(current.is_finite() && current > MIN_HEIGHT) {
            return Err(AssetError::InvalidGeometry(format!("'{}' has zero height", self.name)));
        }

        let scale = height / current;
        let offset = -bounds.center() * scale;
        let parts = self
            .parts
            .iter()
            .map(|part| GeometryPart::new(part.name.clone(), part.bounds.scaled_translated(scale, offset)))
            .collect();

        log::debug!("Normalized '{}' by {scale:.4} to height {height}", self.name);
        Ok(Self {
            name: self.name.clone(),
            parts,
        })
    }
}
