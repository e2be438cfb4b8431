//! Placed objects and the single selection
//!
//! [`SelectionRegistry`] owns every placed [`SceneObject`] and at most one
//! selected handle into that set. Handles are generational, so a handle to a
//! deleted object never resolves again even after its slot is reused.

use crate::foundation::collections::{ObjectId, ObjectMap};
use crate::foundation::math::Vec2;
use crate::scene::SceneObject;
use crate::spatial::Ray;
use crate::view::Camera;

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Placed object owning the part that was hit
    pub object: ObjectId,
    /// Index of the part within the object's geometry
    pub part: usize,
    /// Distance along the ray
    pub distance: f32,
}

/// A change of the selected object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    /// Previously selected object
    pub previous: Option<ObjectId>,
    /// Newly selected object
    pub current: Option<ObjectId>,
}

/// Owner of the placed set and the current selection
#[derive(Debug)]
pub struct SelectionRegistry {
    objects: ObjectMap<SceneObject>,
    order: Vec<ObjectId>,
    selected: Option<ObjectId>,
    placed_opacity: f32,
    selected_opacity: f32,
}

impl SelectionRegistry {
    /// Create an empty registry with the given highlight opacities
    pub fn new(placed_opacity: f32, selected_opacity: f32) -> Self {
        Self {
            objects: ObjectMap::with_key(),
            order: Vec::new(),
            selected: None,
            placed_opacity,
            selected_opacity,
        }
    }

    /// Add an object to the placed set without touching the selection
    pub fn place(&mut self, object: SceneObject) -> ObjectId {
        let id = self.objects.insert(object);
        self.order.push(id);
        log::debug!("Placed object {id:?} ({} total)", self.order.len());
        id
    }

    /// Nearest placed object hit by a world-space ray
    ///
    /// Every part of every object is tested against its posed bounds; the
    /// hit resolves to the object that owns the part.
    pub fn pick(&self, ray: &Ray) -> Option<PickHit> {
        let mut closest: Option<PickHit> = None;

        for &id in &self.order {
            let Some(object) = self.objects.get(id) else { continue };
            let model = object.model_matrix();
            for (part, geometry_part) in object.geometry().parts().iter().enumerate() {
                let Some(distance) = geometry_part.bounds.intersect_ray_transformed(ray, &model) else {
                    continue;
                };
                if closest.map_or(true, |hit| distance < hit.distance) {
                    closest = Some(PickHit { object: id, part, distance });
                }
            }
        }

        closest
    }

    /// Pick through a screen point in device pixels
    pub fn pick_screen(&self, camera: &Camera, point: Vec2) -> Option<PickHit> {
        camera.screen_to_world_ray(point).and_then(|ray| self.pick(&ray))
    }

    /// Select a placed object
    ///
    /// The previous selection's opacity is restored before the new one is
    /// highlighted. Returns `None` when nothing changed or `id` is not placed.
    pub fn select(&mut self, id: ObjectId) -> Option<SelectionChange> {
        if self.selected == Some(id) || !self.objects.contains_key(id) {
            return None;
        }

        let previous = self.selected.take();
        self.restore(previous);

        if let Some(object) = self.objects.get_mut(id) {
            object.set_opacity(self.selected_opacity);
        }
        self.selected = Some(id);

        log::debug!("Selection changed: {previous:?} -> {id:?}");
        Some(SelectionChange {
            previous,
            current: Some(id),
        })
    }

    /// Clear the selection
    pub fn deselect(&mut self) -> Option<SelectionChange> {
        let previous = self.selected.take()?;
        self.restore(Some(previous));
        log::debug!("Selection cleared: {previous:?}");
        Some(SelectionChange {
            previous: Some(previous),
            current: None,
        })
    }

    fn restore(&mut self, id: Option<ObjectId>) {
        if let Some(object) = id.and_then(|id| self.objects.get_mut(id)) {
            object.set_opacity(self.placed_opacity);
        }
    }

    /// Remove the selected object from the placed set
    ///
    /// No-op when nothing is selected.
    pub fn delete_selected(&mut self) -> Option<(ObjectId, SceneObject)> {
        let id = self.selected.take()?;
        self.order.retain(|&placed| placed != id);
        let object = self.objects.remove(id)?;
        log::debug!("Deleted object {id:?} ({} remaining)", self.order.len());
        Some((id, object))
    }

    /// Currently selected object
    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Look up a placed object
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Mutable access to a placed object
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    /// Whether `id` is in the placed set
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Placed objects in placement order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.order
            .iter()
            .filter_map(|&id| self.objects.get(id).map(|object| (id, object)))
    }

    /// Number of placed objects
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is placed
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for SelectionRegistry {
    fn default() -> Self {
        Self::new(1.0, 0.8)
    }
}
