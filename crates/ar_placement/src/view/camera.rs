//! # Viewer Camera
//!
//! Perspective camera driven by the tracked viewer pose.
//!
//! ## Coordinate System
//! - World space is right-handed Y-up
//! - The camera looks down its local -Z axis
//! - Screen space is in device pixels with the origin at the top-left
//! - NDC follows OpenGL conventions: X right, Y up, Z in [-1, 1]

use nalgebra::{Isometry3, Translation3};

use crate::config::{CameraConfig, ViewportConfig};
use crate::foundation::math::{utils, Mat4, Pose, Quat, Vec2, Vec3, Vec4};
use crate::spatial::Ray;

/// Perspective camera positioned by the viewer pose
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Camera orientation in world space
    pub orientation: Quat,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,

    /// Viewport width in device pixels
    width: u32,

    /// Viewport height in device pixels
    height: u32,
}

impl Camera {
    /// Create a camera at the origin looking down -Z
    pub fn new(config: &CameraConfig, viewport: &ViewportConfig) -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            fov: utils::deg_to_rad(config.fov_y_degrees),
            near: config.near,
            far: config.far,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
        }
    }

    /// Move the camera to the viewer pose
    pub fn set_pose(&mut self, pose: &Pose) {
        self.position = pose.position;
        self.orientation = pose.orientation;
        log::trace!("Camera pose updated to: {:?}", pose.position);
    }

    /// Place the camera at `eye` looking at `target` with +Y up
    ///
    /// Ignored when the view direction is vertical or zero, since no stable
    /// orientation exists for it.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        let backward = eye - target;
        if backward.cross(&Vec3::y()).norm() < 1e-6 {
            log::warn!("Camera look_at ignored: view direction is parallel to up");
            return;
        }
        self.position = eye;
        self.orientation = Quat::face_towards(&backward, &Vec3::y());
    }

    /// Update viewport size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Viewport size in device pixels
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Aspect ratio (width / height)
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
            .inverse()
            .to_homogeneous()
    }

    /// View-to-clip matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect(), self.fov, self.near, self.far)
    }

    /// Forward direction in world space
    pub fn forward(&self) -> Vec3 {
        self.orientation * -Vec3::z()
    }

    /// Right direction in world space
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::x()
    }

    /// Camera right and forward directions flattened onto the XZ plane
    ///
    /// Both are unit length with zero Y. When the camera is rolled onto its
    /// side the world X axis stands in for right.
    pub fn horizontal_axes(&self) -> (Vec3, Vec3) {
        let right = self.right();
        let right = Vec3::new(right.x, 0.0, right.z)
            .try_normalize(1e-6)
            .unwrap_or_else(Vec3::x);
        let forward = Vec3::y().cross(&right);
        (right, forward)
    }

    /// Convert a screen point (pixels, top-left origin) to NDC
    pub fn screen_to_ndc(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            (point.x / self.width as f32) * 2.0 - 1.0,
            -(point.y / self.height as f32) * 2.0 + 1.0,
        )
    }

    /// Cast a world-space ray from the viewpoint through a screen point
    ///
    /// Returns `None` if the view-projection matrix is singular.
    pub fn screen_to_world_ray(&self, point: Vec2) -> Option<Ray> {
        let ndc = self.screen_to_ndc(point);
        let inv_view_proj = (self.projection_matrix() * self.view_matrix()).try_inverse()?;

        let unproject = |z: f32| {
            let h = inv_view_proj * Vec4::new(ndc.x, ndc.y, z, 1.0);
            Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w)
        };
        let near = unproject(-1.0);
        let far = unproject(1.0);

        Ray::new(self.position, far - near)
    }

    /// Project a world point to screen pixels
    ///
    /// Returns `None` for points behind the camera.
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.projection_matrix() * self.view_matrix() * Vec4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
        ))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default(), &ViewportConfig::default())
    }
}
