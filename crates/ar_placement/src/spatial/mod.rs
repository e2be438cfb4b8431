//! Spatial primitives for picking and drag projection
//!
//! Provides rays, axis-aligned boxes and horizontal planes with the
//! intersection tests the picking and gesture code need.
//!
//! # Key Types
//!
//! - [`Ray`] - World-space ray cast from the viewpoint
//! - [`Aabb`] - Axis-aligned bounds in model space
//! - [`Plane`] - Horizontal placement plane

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Directions shorter than this cannot be normalized
const MIN_DIRECTION: f32 = 1e-8;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    ///
    /// Returns `None` for a zero-length direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        direction
            .try_normalize(MIN_DIRECTION)
            .map(|direction| Self { origin, direction })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray by a matrix without renormalizing
    ///
    /// Distances along the transformed ray stay in the parameter space of the
    /// original ray, so hits found in local space compare directly with hits
    /// from other objects.
    fn transformed_unnormalized(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point(&Point3::from(self.origin)).coords,
            direction: matrix.transform_vector(&self.direction),
        }
    }
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest AABB containing all points, `None` when empty
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| Self {
            min: bounds.min.inf(&p),
            max: bounds.max.sup(&p),
        }))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Smallest AABB containing both
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Uniformly scale about the origin, then translate
    pub fn scaled_translated(&self, scale: f32, offset: Vec3) -> Self {
        Self {
            min: self.min * scale + offset,
            max: self.max * scale + offset,
        }
    }

    /// Slab-method ray intersection
    ///
    /// Returns the entry distance, or the exit distance when the origin is
    /// inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            if direction.abs() < f32::EPSILON {
                // Parallel to this slab: must already be inside it
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(if t_min >= 0.0 { t_min } else { t_max })
    }

    /// Ray intersection against this box placed by a model matrix
    ///
    /// The ray is moved into model space instead of transforming the box,
    /// which keeps rotated boxes exact.
    pub fn intersect_ray_transformed(&self, ray: &Ray, model: &Mat4) -> Option<f32> {
        let inverse = model.try_inverse()?;
        self.intersect_ray(&ray.transformed_unnormalized(&inverse))
    }
}

/// A horizontal plane `y = height`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Height of the plane above the world origin
    pub height: f32,
}

impl Plane {
    /// Create a horizontal plane at the given height
    pub fn horizontal(height: f32) -> Self {
        Self { height }
    }

    /// Point where the ray crosses the plane, if in front of the origin
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        if ray.direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (self.height - ray.origin.y) / ray.direction.y;
        (t > 0.0).then(|| ray.point_at(t))
    }
}
