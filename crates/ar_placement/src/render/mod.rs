//! Render surface interface
//!
//! Drawing happens outside this crate. Once per tick the session hands the
//! host a [`RenderFrame`] describing what is visible.

use crate::foundation::math::Pose;
use crate::scene::SceneObject;
use crate::view::Camera;

/// Everything visible this frame
#[derive(Debug)]
pub struct RenderFrame<'a> {
    /// Viewpoint
    pub camera: &'a Camera,
    /// Placed objects in placement order, followed by the preview if visible
    pub objects: Vec<&'a SceneObject>,
    /// Surface reticle, shown while a surface is detected
    pub reticle: Option<Pose>,
}

impl RenderFrame<'_> {
    /// Objects that need alpha blending
    pub fn transparent_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|object| object.material().is_transparent())
            .count()
    }
}

/// Host renderer
pub trait RenderSurface {
    /// Draw one frame
    fn render_frame(&mut self, frame: &RenderFrame<'_>);
}
