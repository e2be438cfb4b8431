//! # AR Session
//!
//! One placement session: every piece of mutable state lives in an
//! [`ArSession`] value, so independent sessions can run side by side.
//!
//! ## Frame Loop
//!
//! ```text
//! frame():  viewer pose ─▶ Camera
//!           TrackingSession ─▶ SurfaceTracker ─▶ PlacementController ─▶ RenderSurface
//!
//! between frames:
//!           TouchEvent ─▶ GestureStateMachine ─▶ SelectionRegistry
//!           UiAction   ─▶ PlacementController / SelectionRegistry
//! ```
//!
//! Touch events and UI actions are handled synchronously, so a frame never
//! observes a half-applied gesture.

use thiserror::Error;

use crate::catalog::{Catalog, CatalogItem, CatalogKey};
use crate::config::{ConfigError, SessionConfig};
use crate::events::{EventQueue, SessionEvent, SessionEventHandler, SessionEventKind};
use crate::foundation::collections::ObjectId;
use crate::foundation::math::Pose;
use crate::input::{GestureContext, GestureEffect, GestureMode, GestureStateMachine, TouchEvent};
use crate::placement::{PlacementController, PlacementError, PlacementStatus};
use crate::render::{RenderFrame, RenderSurface};
use crate::scene::SceneObject;
use crate::selection::SelectionRegistry;
use crate::tracking::{SurfaceTracker, TrackingSession};
use crate::view::Camera;

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// The requested item is not in the catalog
    #[error("Unknown catalog item: {0}")]
    UnknownItem(CatalogKey),

    /// The session configuration is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Button presses from the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// A catalog thumbnail was tapped
    ShowItem(CatalogKey),
    /// "Place" was tapped
    Confirm,
    /// "Cancel" was tapped
    Cancel,
    /// "Delete" was tapped
    DeleteSelected,
}

/// A running placement session
#[derive(Debug)]
pub struct ArSession {
    config: SessionConfig,
    tracker: SurfaceTracker,
    placement: PlacementController,
    registry: SelectionRegistry,
    gestures: GestureStateMachine,
    camera: Camera,
    events: EventQueue,
    last_status: PlacementStatus,
}

impl ArSession {
    /// Create a session from a validated configuration
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let session = Self {
            tracker: SurfaceTracker::new(),
            placement: PlacementController::new(&config.placement),
            registry: SelectionRegistry::new(config.placement.placed_opacity, config.placement.selected_opacity),
            gestures: GestureStateMachine::new(config.gesture.clone()),
            camera: Camera::new(&config.camera, &config.viewport),
            events: EventQueue::new(),
            last_status: PlacementStatus::Idle,
            config,
        };
        log::info!(
            "AR session started ({}x{}, empty tap: {:?})",
            session.config.viewport.width,
            session.config.viewport.height,
            session.config.placement.empty_tap
        );
        Ok(session)
    }

    /// Run one frame: sample the surface, move the preview, render
    pub fn frame(&mut self, tracking: &mut dyn TrackingSession, renderer: &mut dyn RenderSurface) {
        if let Some(viewer) = tracking.viewer_pose() {
            self.camera.set_pose(&viewer);
        }

        let sample = self.tracker.sample(tracking);
        self.placement.update_preview(sample);
        self.sync_status();

        renderer.render_frame(&self.render_frame());
    }

    /// What should be drawn right now
    pub fn render_frame(&self) -> RenderFrame<'_> {
        let mut objects: Vec<&SceneObject> = self.registry.iter().map(|(_, object)| object).collect();
        objects.extend(self.placement.visible_preview());
        RenderFrame {
            camera: &self.camera,
            objects,
            reticle: self.placement.reticle(),
        }
    }

    /// Feed one touch event to the gesture state machine
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Option<GestureEffect> {
        let mut ctx = GestureContext {
            registry: &mut self.registry,
            camera: &self.camera,
            surface: self.tracker.latest().pose(),
            empty_tap: self.config.placement.empty_tap,
        };
        let effect = self.gestures.handle(event, &mut ctx);

        if let Some(GestureEffect::Selected(change) | GestureEffect::Deselected(change)) = effect {
            self.events.send(SessionEvent::SelectionChanged(change.current));
        }
        effect
    }

    /// Apply a UI button press
    ///
    /// Placement preconditions are reported through the status line, not as
    /// errors; only an unknown catalog item fails.
    pub fn handle_action(&mut self, action: UiAction, catalog: &Catalog) -> Result<(), SessionError> {
        match action {
            UiAction::ShowItem(key) => {
                let item = catalog.get(&key).ok_or(SessionError::UnknownItem(key))?;
                self.show_preview(item);
            }
            UiAction::Confirm => {
                // Already logged and shown in the status line
                let _ = self.confirm();
            }
            UiAction::Cancel => {
                self.cancel();
            }
            UiAction::DeleteSelected => {
                self.delete_selected();
            }
        }
        Ok(())
    }

    /// Show a preview of `item`, replacing any existing one
    pub fn show_preview(&mut self, item: &CatalogItem) {
        self.placement.show_preview(item);
        self.events.send(SessionEvent::PreviewChanged { visible_controls: true });
        self.sync_status();
    }

    /// Place the preview on the current surface
    pub fn confirm(&mut self) -> Result<ObjectId, PlacementError> {
        let result = self.placement.confirm(&mut self.registry);
        if result.is_ok() {
            self.events.send(SessionEvent::PlacementChanged {
                placed_count: self.registry.len(),
            });
            self.events.send(SessionEvent::PreviewChanged { visible_controls: false });
        }
        self.sync_status();
        result
    }

    /// Discard the preview
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.placement.cancel();
        if cancelled {
            self.events.send(SessionEvent::PreviewChanged { visible_controls: false });
            self.sync_status();
        }
        cancelled
    }

    /// Delete the selected object, if any
    pub fn delete_selected(&mut self) -> Option<ObjectId> {
        let (id, object) = self.registry.delete_selected()?;
        self.gestures.forget(id);
        log::info!("Deleted {} ({id:?})", object.item());

        self.events.send(SessionEvent::ObjectDeleted(id));
        self.events.send(SessionEvent::SelectionChanged(None));
        self.events.send(SessionEvent::PlacementChanged {
            placed_count: self.registry.len(),
        });
        Some(id)
    }

    /// Track a new screen size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        let (width, height) = self.camera.viewport();
        self.config.viewport.width = width;
        self.config.viewport.height = height;
        log::debug!("Viewport resized to {width}x{height}");
    }

    /// Move the viewpoint
    pub fn set_viewer_pose(&mut self, pose: &Pose) {
        self.camera.set_pose(pose);
    }

    fn sync_status(&mut self) {
        let status = self.placement.status();
        if status != self.last_status {
            log::debug!("Placement status {:?} -> {status:?}", self.last_status);
            self.last_status = status;
            self.events.send(SessionEvent::StatusChanged(status.message().to_string()));
        }
    }

    /// Register a notification handler
    pub fn register_handler(&mut self, kind: SessionEventKind, handler: Box<dyn SessionEventHandler>) {
        self.events.register_handler(kind, handler);
    }

    /// Deliver pending notifications to handlers and return them
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.dispatch()
    }

    /// Placed objects in placement order
    pub fn placed_objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.registry.iter()
    }

    /// Placed objects and selection
    pub fn registry(&self) -> &SelectionRegistry {
        &self.registry
    }

    /// The preview, if one exists
    pub fn preview(&self) -> Option<&SceneObject> {
        self.placement.preview()
    }

    /// Reticle pose while a surface is detected
    pub fn reticle(&self) -> Option<Pose> {
        self.placement.reticle()
    }

    /// Placement guidance
    pub fn status(&self) -> PlacementStatus {
        self.placement.status()
    }

    /// Selected object
    pub fn selected(&self) -> Option<ObjectId> {
        self.registry.selected()
    }

    /// Active gesture
    pub fn gesture_mode(&self) -> GestureMode {
        self.gestures.mode()
    }

    /// Viewpoint
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Configuration in use
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
