//! # Gesture State Machine
//!
//! Turns a raw multi-touch stream into exactly one manipulation at a time on
//! the selected object.
//!
//! ```text
//!            1 touch on object              2 touches, spread < threshold
//!   Idle ───────────────────────▶ Rotating ───────────────────────────▶ Dragging
//!    ▲                              ▲  │     2 touches, spread ≥ threshold    │
//!    │                              │  └──────────────────────────▶ Scaling ◀┘ spread changed
//!    │      0 touches left          │   2 → 1 touches                  │        past deadzone
//!    └──────────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! ## Noise Handling
//!
//! - A single touch must travel `move_threshold_px` from where it landed
//!   before any rotation is applied.
//! - A pinch must change the inter-touch distance by `pinch_deadzone_px`
//!   before scaling engages. A drag whose spread changes by more than that
//!   becomes a pinch for the rest of the sequence.
//! - Lifting one of two fingers re-arms rotation from the remaining finger's
//!   current position, so the object does not jump.
//! - Lifting back to two fingers from three or more re-classifies the pair
//!   by spread, the same way a two-finger touch-start does.
//!
//! ## Drag Realisation
//!
//! A drag picks how screen motion maps to the world when it begins. With a
//! tracked surface it re-casts the centroid against that surface's plane for
//! the rest of the drag; without one it moves along the camera's flattened
//! axes at `movement_speed` per pixel. Surface dropouts mid-drag do not
//! switch between the two.

use crate::config::{EmptyTapPolicy, GestureConfig};
use crate::foundation::collections::ObjectId;
use crate::foundation::math::{utils, Pose, Vec2, Vec3};
use crate::selection::{SelectionChange, SelectionRegistry};
use crate::spatial::Plane;
use crate::view::Camera;

use super::touch::{TouchEvent, TouchPhase, TouchPoint};

/// Initial pinch distances at or below this cannot be divided by
const MIN_PINCH_DISTANCE: f32 = 1e-3;

/// Currently active interpretation of the touch sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    /// No gesture in progress
    #[default]
    Idle,
    /// One finger rotating the selection about the vertical axis
    Rotating,
    /// Two fingers moving the selection across the placement plane
    Dragging,
    /// Two fingers pinching to rescale the selection
    Scaling,
}

/// Result of handling a touch event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    /// A tap selected an object
    Selected(SelectionChange),
    /// A tap on empty space cleared the selection
    Deselected(SelectionChange),
    /// The target was rotated about world Y
    Rotated {
        /// Rotated object
        object: ObjectId,
        /// Yaw delta in radians
        angle: f32,
    },
    /// The target was moved horizontally
    Translated {
        /// Moved object
        object: ObjectId,
        /// World-space offset with zero Y
        delta: Vec3,
    },
    /// The target was rescaled
    Scaled {
        /// Rescaled object
        object: ObjectId,
        /// New uniform scale
        scale: f32,
    },
}

/// Everything the state machine reads or mutates while handling an event
pub struct GestureContext<'a> {
    /// Placed objects and selection
    pub registry: &'a mut SelectionRegistry,
    /// Viewpoint used for picking and drag projection
    pub camera: &'a Camera,
    /// Latest valid surface pose, if any
    pub surface: Option<Pose>,
    /// What a tap on empty space does
    pub empty_tap: EmptyTapPolicy,
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    initial_distance: f32,
    initial_scale: f32,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Rotating {
        anchor: Vec2,
        last_x: f32,
        committed: bool,
    },
    Dragging {
        last_centroid: Vec2,
        pinch: Pinch,
        /// Height of the plane the drag follows, fixed when the drag began
        surface_height: Option<f32>,
    },
    Scaling {
        pinch: Pinch,
        engaged: bool,
    },
}

impl Phase {
    fn rotating(at: Vec2) -> Self {
        Self::Rotating {
            anchor: at,
            last_x: at.x,
            committed: false,
        }
    }

    /// Classify a two-finger pair by spread
    fn two_finger(config: &GestureConfig, a: &TouchPoint, b: &TouchPoint, scale: f32, surface: Option<Pose>) -> Self {
        let pinch = Pinch {
            initial_distance: (a.position - b.position).norm(),
            initial_scale: scale,
        };
        if pinch.initial_distance < config.drag_scale_threshold_px {
            Self::Dragging {
                last_centroid: utils::midpoint(a.position, b.position),
                pinch,
                surface_height: surface.map(|pose| pose.position.y),
            }
        } else {
            Self::Scaling { pinch, engaged: false }
        }
    }

    fn mode(&self) -> GestureMode {
        match self {
            Self::Rotating { .. } => GestureMode::Rotating,
            Self::Dragging { .. } => GestureMode::Dragging,
            Self::Scaling { .. } => GestureMode::Scaling,
        }
    }
}

/// Per touch sequence state, dropped when the last finger lifts
#[derive(Debug, Clone, Copy)]
struct GestureSession {
    target: ObjectId,
    phase: Phase,
}

/// Converts touch events into manipulations of the selected object
#[derive(Debug, Default)]
pub struct GestureStateMachine {
    config: GestureConfig,
    session: Option<GestureSession>,
}

impl GestureStateMachine {
    /// Create an idle state machine
    pub fn new(config: GestureConfig) -> Self {
        Self { config, session: None }
    }

    /// Active gesture mode
    pub fn mode(&self) -> GestureMode {
        self.session.map_or(GestureMode::Idle, |s| s.phase.mode())
    }

    /// Object the current gesture acts on
    pub fn target(&self) -> Option<ObjectId> {
        self.session.map(|s| s.target)
    }

    /// Gesture thresholds and speeds
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Drop the gesture session if it targets `id`
    pub fn forget(&mut self, id: ObjectId) {
        if self.target() == Some(id) {
            log::debug!("Gesture target {id:?} removed, resetting");
            self.reset();
        }
    }

    /// Drop any gesture session
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Gesture {:?} -> Idle", session.phase.mode());
        }
    }

    /// Handle one touch event
    pub fn handle(&mut self, event: &TouchEvent, ctx: &mut GestureContext<'_>) -> Option<GestureEffect> {
        match event.phase {
            TouchPhase::Start => self.on_start(&event.touches, ctx),
            TouchPhase::Move => self.on_move(&event.touches, ctx),
            TouchPhase::End | TouchPhase::Cancel => {
                self.on_end(&event.touches, ctx);
                None
            }
        }
    }

    fn begin(&mut self, target: ObjectId, phase: Phase) {
        log::debug!("Gesture {:?} -> {:?} on {target:?}", self.mode(), phase.mode());
        self.session = Some(GestureSession { target, phase });
    }

    fn on_start(&mut self, touches: &[TouchPoint], ctx: &mut GestureContext<'_>) -> Option<GestureEffect> {
        match touches {
            [touch] => {
                self.reset();
                if let Some(hit) = ctx.registry.pick_screen(ctx.camera, touch.position) {
                    let change = ctx.registry.select(hit.object);
                    self.begin(hit.object, Phase::rotating(touch.position));
                    return change.map(GestureEffect::Selected);
                }
                match ctx.empty_tap {
                    EmptyTapPolicy::Deselect => ctx.registry.deselect().map(GestureEffect::Deselected),
                    EmptyTapPolicy::KeepSelection => None,
                }
            }
            [a, b] => {
                let Some((target, scale)) = ctx
                    .registry
                    .selected()
                    .and_then(|id| ctx.registry.get(id).map(|object| (id, object.scale())))
                else {
                    self.reset();
                    return None;
                };

                let phase = Phase::two_finger(&self.config, a, b, scale, ctx.surface);
                self.begin(target, phase);
                None
            }
            _ => None,
        }
    }

    fn on_move(&mut self, touches: &[TouchPoint], ctx: &mut GestureContext<'_>) -> Option<GestureEffect> {
        let mut session = self.session?;
        if ctx.registry.selected() != Some(session.target) {
            self.reset();
            return None;
        }

        let effect = match (&mut session.phase, touches) {
            (Phase::Rotating { anchor, last_x, committed }, [touch]) => {
                if !*committed {
                    if (touch.position - *anchor).norm() <= self.config.move_threshold_px {
                        return None;
                    }
                    *committed = true;
                }
                let delta_x = touch.position.x - *last_x;
                *last_x = touch.position.x;
                self.rotate(session.target, delta_x, ctx)
            }
            (Phase::Dragging { last_centroid, pinch, surface_height }, [a, b]) => {
                let distance = (a.position - b.position).norm();
                if (distance - pinch.initial_distance).abs() > self.config.pinch_deadzone_px {
                    let pinch = *pinch;
                    log::debug!("Gesture Dragging -> Scaling on {:?}", session.target);
                    session.phase = Phase::Scaling { pinch, engaged: true };
                    self.scale(session.target, pinch, distance, ctx)
                } else {
                    let centroid = utils::midpoint(a.position, b.position);
                    let delta = self.drag_delta(*last_centroid, centroid, *surface_height, ctx.camera);
                    *last_centroid = centroid;
                    self.translate(session.target, delta, ctx)
                }
            }
            (Phase::Scaling { pinch, engaged }, [a, b]) => {
                let distance = (a.position - b.position).norm();
                if !*engaged {
                    if (distance - pinch.initial_distance).abs() <= self.config.pinch_deadzone_px {
                        return None;
                    }
                    *engaged = true;
                }
                self.scale(session.target, *pinch, distance, ctx)
            }
            // Touch count does not match the active mode
            _ => None,
        };

        self.session = Some(session);
        effect
    }

    fn on_end(&mut self, touches: &[TouchPoint], ctx: &GestureContext<'_>) {
        let Some(session) = self.session.as_mut() else { return };
        if ctx.registry.selected() != Some(session.target) {
            self.reset();
            return;
        }

        match touches {
            [] => self.reset(),
            [touch] => {
                if session.phase.mode() != GestureMode::Rotating {
                    log::debug!("Gesture {:?} -> Rotating on {:?}", session.phase.mode(), session.target);
                }
                session.phase = Phase::rotating(touch.position);
            }
            [a, b, ..] => {
                // A finger lifted from three or more: re-baseline on the remaining pair
                let Some(scale) = ctx.registry.get(session.target).map(|object| object.scale()) else {
                    return;
                };
                let pinch = Pinch {
                    initial_distance: (a.position - b.position).norm(),
                    initial_scale: scale,
                };
                session.phase = match session.phase {
                    Phase::Dragging { surface_height, .. } => Phase::Dragging {
                        last_centroid: utils::midpoint(a.position, b.position),
                        pinch,
                        surface_height,
                    },
                    Phase::Scaling { .. } => Phase::Scaling { pinch, engaged: false },
                    Phase::Rotating { .. } => {
                        let phase = Phase::two_finger(&self.config, a, b, scale, ctx.surface);
                        log::debug!("Gesture Rotating -> {:?} on {:?}", phase.mode(), session.target);
                        phase
                    }
                };
            }
        }
    }

    fn rotate(&self, target: ObjectId, delta_x: f32, ctx: &mut GestureContext<'_>) -> Option<GestureEffect> {
        if delta_x == 0.0 {
            return None;
        }
        let angle = delta_x * self.config.rotation_speed;
        ctx.registry.get_mut(target)?.rotate_yaw(angle);
        log::trace!("Rotated {target:?} by {angle:.4} rad");
        Some(GestureEffect::Rotated { object: target, angle })
    }

    fn translate(&self, target: ObjectId, delta: Vec3, ctx: &mut GestureContext<'_>) -> Option<GestureEffect> {
        if delta.x == 0.0 && delta.z == 0.0 {
            return None;
        }
        ctx.registry.get_mut(target)?.translate_horizontal(delta.x, delta.z);
        log::trace!("Moved {target:?} by ({:.4}, {:.4})", delta.x, delta.z);
        Some(GestureEffect::Translated {
            object: target,
            delta: Vec3::new(delta.x, 0.0, delta.z),
        })
    }

    fn scale(&self, target: ObjectId, pinch: Pinch, distance: f32, ctx: &mut GestureContext<'_>) -> Option<GestureEffect> {
        if pinch.initial_distance <= MIN_PINCH_DISTANCE {
            return None;
        }
        let scale = self
            .config
            .clamp_scale(pinch.initial_scale * (distance / pinch.initial_distance));
        ctx.registry.get_mut(target)?.set_scale(scale);
        log::trace!("Scaled {target:?} to {scale:.3}");
        Some(GestureEffect::Scaled { object: target, scale })
    }

    /// Horizontal world offset for a centroid moving between two screen points
    ///
    /// With a plane height both points are re-cast against that plane; a step
    /// whose rays miss it (at or above the horizon) moves nothing. Without
    /// one the offset follows the camera's flattened axes at
    /// `movement_speed` per pixel.
    fn drag_delta(&self, from: Vec2, to: Vec2, surface_height: Option<f32>, camera: &Camera) -> Vec3 {
        if let Some(height) = surface_height {
            let plane = Plane::horizontal(height);
            let hit = |point: Vec2| camera.screen_to_world_ray(point).and_then(|ray| plane.intersect_ray(&ray));
            return match (hit(from), hit(to)) {
                (Some(start), Some(end)) => Vec3::new(end.x - start.x, 0.0, end.z - start.z),
                _ => Vec3::zeros(),
            };
        }

        let (right, forward) = camera.horizontal_axes();
        let screen = to - from;
        (right * screen.x - forward * screen.y) * self.config.movement_speed
    }
}
