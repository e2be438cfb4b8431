//! Math utilities and types
//!
//! Provides the math types shared by tracking, picking and gesture handling.
//! All coordinates are Y-up right-handed; the placement plane is horizontal (XZ).

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type (screen space, device pixels)
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Scale factors below this are treated as degenerate
const DEGENERATE_SCALE: f32 = 1e-6;

/// Transform representing position, rotation, and non-uniform scale
///
/// Used to decompose the 4x4 pose matrices delivered by the tracking session.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Decompose a transformation matrix into translation, rotation and scale
    ///
    /// Returns `None` when any axis has (near) zero scale, since no rotation
    /// can be recovered from a collapsed basis.
    pub fn try_from_matrix(matrix: &Mat4) -> Option<Self> {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
        let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
        let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
        let scale = Vec3::new(scale_x, scale_y, scale_z);

        if scale.iter().any(|s| !s.is_finite() || *s < DEGENERATE_SCALE) || !position.iter().all(|p| p.is_finite()) {
            return None;
        }

        let rotation_matrix = Mat3::new(
            matrix.m11 / scale_x, matrix.m12 / scale_y, matrix.m13 / scale_z,
            matrix.m21 / scale_x, matrix.m22 / scale_y, matrix.m23 / scale_z,
            matrix.m31 / scale_x, matrix.m32 / scale_y, matrix.m33 / scale_z,
        );
        let rotation = Quat::from_matrix(&rotation_matrix);

        Some(Self {
            position,
            rotation,
            scale,
        })
    }
}

/// Position, unit orientation and uniform scale of an object in world space
///
/// The orientation is a unit quaternion, so it is normalized by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World space position
    pub position: Vec3,

    /// World space orientation
    pub orientation: Quat,

    /// Uniform scale factor
    pub scale: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            scale: 1.0,
        }
    }
}

impl Pose {
    /// Identity pose at the origin with unit scale
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a pose from position and orientation with unit scale
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            scale: 1.0,
        }
    }

    /// Create a pose from raw components
    ///
    /// `orientation` is `[x, y, z, w]` and is normalized here. A zero-length
    /// quaternion falls back to identity.
    pub fn from_raw(position: [f32; 3], orientation: [f32; 4]) -> Self {
        let [x, y, z, w] = orientation;
        let orientation = Quat::try_new(Quaternion::new(w, x, y, z), DEGENERATE_SCALE)
            .unwrap_or_else(Quat::identity);
        Self::new(Vec3::new(position[0], position[1], position[2]), orientation)
    }

    /// Create a pose from a 4x4 transform, dropping its scale
    ///
    /// Hit-test poses carry an implicit unit scale; only position and
    /// orientation are kept.
    pub fn from_matrix(matrix: &Mat4) -> Option<Self> {
        Transform::try_from_matrix(matrix).map(|t| Self::new(t.position, t.rotation))
    }

    /// Builder pattern: set uniform scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix (TRS order, uniform scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.orientation.to_homogeneous()
            * Mat4::new_scaling(self.scale)
    }

    /// Rotate about the world Y axis
    ///
    /// Pre-multiplying a world-Y rotation only changes the yaw term of the
    /// Y-X-Z decomposition; pitch and roll are untouched.
    pub fn rotate_yaw(&mut self, angle: f32) {
        let yaw = Quat::from_axis_angle(&Vec3::y_axis(), angle);
        self.orientation = yaw * self.orientation;
        self.orientation.renormalize_fast();
    }

    /// Decompose orientation into `(yaw, pitch, roll)` using Y-X-Z order
    ///
    /// Yaw is about world Y, pitch about the intermediate X axis, roll about
    /// the local Z axis.
    pub fn yaw_pitch_roll(&self) -> (f32, f32, f32) {
        let rotation = self.orientation.to_rotation_matrix();
        let m = rotation.matrix();
        let pitch = utils::clamp(-m[(1, 2)], -1.0, 1.0).asin();
        let yaw = m[(0, 2)].atan2(m[(2, 2)]);
        let roll = m[(1, 0)].atan2(m[(1, 1)]);
        (yaw, pitch, roll)
    }

    /// Copy position and orientation from another pose, keeping this scale
    pub fn anchor_to(&mut self, surface: &Pose) {
        self.position = surface.position;
        self.orientation = surface.orientation;
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec2};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Midpoint of two screen points
    pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
        (a + b) * 0.5
    }
}
