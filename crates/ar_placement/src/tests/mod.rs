//! End-to-end session scenarios driven through [`ArSession`]

use std::sync::{Arc, OnceLock};

use approx::assert_relative_eq;

use crate::prelude::*;
use crate::view::Camera;

/// Tracking double: always ready, serves whatever hits the test sets
struct ScriptedTracking {
    available: bool,
    hits: Vec<HitTestResult>,
    viewer: Pose,
    requests: usize,
}

impl ScriptedTracking {
    /// Viewer at (0, 1, 2) looking at the origin, surface at `surface`
    fn new(surface: Option<Vec3>) -> Self {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(0.0, 1.0, 2.0), Vec3::zeros());
        let mut tracking = Self {
            available: true,
            hits: Vec::new(),
            viewer: Pose::new(camera.position, camera.orientation),
            requests: 0,
        };
        tracking.set_surface(surface);
        tracking
    }

    fn set_surface(&mut self, surface: Option<Vec3>) {
        self.hits = surface
            .map(|at| vec![HitTestResult { transform: Mat4::new_translation(&at) }])
            .unwrap_or_default();
    }
}

impl TrackingSession for ScriptedTracking {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_hit_test_source(&mut self) -> Result<(), TrackingError> {
        self.requests += 1;
        Ok(())
    }

    fn poll_hit_test_source(&mut self) -> SourceStatus {
        SourceStatus::Ready(HitTestSourceId(1))
    }

    fn hit_test_results(&mut self, _source: HitTestSourceId) -> Vec<HitTestResult> {
        self.hits.clone()
    }

    fn viewer_pose(&self) -> Option<Pose> {
        Some(self.viewer)
    }
}

/// Render double: remembers what each frame contained
#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<(Vec<CatalogKey>, bool)>,
}

impl RenderSurface for RecordingRenderer {
    fn render_frame(&mut self, frame: &RenderFrame<'_>) {
        let keys = frame.objects.iter().map(|object| object.item().clone()).collect();
        self.frames.push((keys, frame.reticle.is_some()));
    }
}

/// Two unit-box lamps, loaded once so every session shares their geometry
fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        let mut catalog = Catalog::new();
        for name in ["lamp1", "lamp2"] {
            catalog
                .insert(CatalogItem {
                    key: CatalogKey::new("lamp", name),
                    height: 1.0,
                    geometry: Arc::new(Geometry::unit_box(name)),
                })
                .unwrap();
        }
        catalog
    })
}

fn lamp(name: &str) -> CatalogKey {
    CatalogKey::new("lamp", name)
}

fn session_with(config: SessionConfig) -> ArSession {
    ArSession::new(config.with_viewport(800, 600)).unwrap()
}

fn session() -> ArSession {
    session_with(SessionConfig::default())
}

fn touch(id: u64, x: f32, y: f32) -> TouchPoint {
    TouchPoint::new(id, x, y)
}

/// Place `name` at `at` and return its handle
fn place(session: &mut ArSession, tracking: &mut ScriptedTracking, name: &str, at: Vec3) -> ObjectId {
    let mut renderer = RecordingRenderer::default();
    tracking.set_surface(Some(at));
    session.handle_action(UiAction::ShowItem(lamp(name)), catalog()).unwrap();
    session.frame(tracking, &mut renderer);
    session.confirm().unwrap()
}

fn yaw(session: &ArSession, id: ObjectId) -> f32 {
    session.registry().get(id).unwrap().pose.yaw_pitch_roll().0
}

#[test]
fn test_one_finger_swipe_rotates_then_returns_to_idle() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    let x = place(&mut session, &mut tracking, "lamp1", Vec3::zeros());

    session.handle_touch(&TouchEvent::start(vec![touch(1, 400.0, 300.0)]));
    assert_eq!(session.selected(), Some(x));

    let mut previous = yaw(&session, x);
    for step in [404.0, 407.0, 410.0] {
        session.handle_touch(&TouchEvent::moved(vec![touch(1, step, 300.0)]));
        let current = yaw(&session, x);
        assert!(current > previous, "yaw {current} did not increase past {previous}");
        previous = current;
    }

    session.handle_touch(&TouchEvent::end(Vec::new()));
    assert_eq!(session.gesture_mode(), GestureMode::Idle);
    assert_relative_eq!(yaw(&session, x), previous);
    assert_relative_eq!(previous, 10.0 * 0.01, epsilon = 1e-5);
}

#[test]
fn test_pinch_from_50_to_100_doubles_scale() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    let x = place(&mut session, &mut tracking, "lamp1", Vec3::zeros());

    session.handle_touch(&TouchEvent::start(vec![touch(1, 400.0, 300.0)]));
    session.handle_touch(&TouchEvent::start(vec![touch(1, 375.0, 300.0), touch(2, 425.0, 300.0)]));
    session.handle_touch(&TouchEvent::moved(vec![touch(1, 350.0, 300.0), touch(2, 450.0, 300.0)]));

    assert_eq!(session.gesture_mode(), GestureMode::Scaling);
    assert_relative_eq!(session.registry().get(x).unwrap().scale(), 2.0, epsilon = 1e-5);
}

#[test]
fn test_pinch_respects_lower_max_scale() {
    let config = SessionConfig::default().with_gesture(GestureConfig::default().with_scale_limits(0.5, 1.5));
    let mut session = session_with(config);
    let mut tracking = ScriptedTracking::new(None);
    let x = place(&mut session, &mut tracking, "lamp1", Vec3::zeros());

    session.handle_touch(&TouchEvent::start(vec![touch(1, 400.0, 300.0)]));
    session.handle_touch(&TouchEvent::start(vec![touch(1, 375.0, 300.0), touch(2, 425.0, 300.0)]));
    session.handle_touch(&TouchEvent::moved(vec![touch(1, 350.0, 300.0), touch(2, 450.0, 300.0)]));

    assert_relative_eq!(session.registry().get(x).unwrap().scale(), 1.5);
}

#[test]
fn test_second_preview_replaces_first() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(Some(Vec3::new(0.0, 0.0, -1.0)));
    let mut renderer = RecordingRenderer::default();
    let catalog = catalog();

    session.handle_action(UiAction::ShowItem(lamp("lamp1")), catalog).unwrap();
    session.handle_action(UiAction::ShowItem(lamp("lamp2")), catalog).unwrap();
    session.frame(&mut tracking, &mut renderer);

    assert_eq!(session.preview().unwrap().item(), &lamp("lamp2"));
    assert_eq!(session.placed_objects().count(), 0);
    assert_eq!(renderer.frames, vec![(vec![lamp("lamp2")], true)]);
}

#[test]
fn test_confirm_without_surface_is_a_no_op() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    let mut renderer = RecordingRenderer::default();
    let catalog = catalog();

    session.handle_action(UiAction::ShowItem(lamp("lamp1")), catalog).unwrap();
    session.frame(&mut tracking, &mut renderer);
    session.handle_action(UiAction::Confirm, catalog).unwrap();

    assert_eq!(session.confirm(), Err(PlacementError::NoSurface));
    assert_eq!(session.placed_objects().count(), 0);
    let preview = session.preview().unwrap();
    assert_eq!(preview.item(), &lamp("lamp1"));
    assert_relative_eq!(preview.opacity(), 0.5);
    assert_eq!(session.status().message(), "Point at a surface to place the model");
    assert_eq!(renderer.frames, vec![(Vec::new(), false)]);
}

#[test]
fn test_placed_objects_have_independent_materials() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    let a = place(&mut session, &mut tracking, "lamp1", Vec3::new(-1.5, 0.0, -1.0));
    let b = place(&mut session, &mut tracking, "lamp1", Vec3::zeros());

    let geometry_a = session.registry().get(a).unwrap().geometry().clone();
    let geometry_b = session.registry().get(b).unwrap().geometry().clone();
    assert!(Arc::ptr_eq(&geometry_a, &geometry_b));

    // Highlighting B leaves A opaque
    session.handle_touch(&TouchEvent::start(vec![touch(1, 400.0, 300.0)]));
    session.handle_touch(&TouchEvent::end(Vec::new()));

    assert_eq!(session.selected(), Some(b));
    assert_relative_eq!(session.registry().get(b).unwrap().opacity(), 0.8);
    assert_relative_eq!(session.registry().get(a).unwrap().opacity(), 1.0);
}

#[test]
fn test_confirm_leaves_preview_material_untouched() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(Some(Vec3::zeros()));
    session.handle_action(UiAction::ShowItem(lamp("lamp1")), catalog()).unwrap();
    session.frame(&mut tracking, &mut RecordingRenderer::default());

    let preview = session.preview().unwrap().clone();
    let id = session.confirm().unwrap();

    assert_relative_eq!(preview.opacity(), 0.5);
    assert_relative_eq!(session.registry().get(id).unwrap().opacity(), 1.0);
    assert!(session.preview().is_none());
}

#[test]
fn test_selecting_b_restores_a() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    // Both in view: A left of centre, B right of centre
    let a = place(&mut session, &mut tracking, "lamp1", Vec3::new(-0.8, 0.0, 0.0));
    let b = place(&mut session, &mut tracking, "lamp2", Vec3::new(0.8, 0.0, 0.0));
    session.drain_events();

    let a_screen = 400.0 - 170.0;
    let b_screen = 400.0 + 170.0;
    session.handle_touch(&TouchEvent::start(vec![touch(1, a_screen, 300.0)]));
    session.handle_touch(&TouchEvent::end(Vec::new()));
    assert_eq!(session.selected(), Some(a));

    session.handle_touch(&TouchEvent::start(vec![touch(1, b_screen, 300.0)]));
    session.handle_touch(&TouchEvent::end(Vec::new()));

    assert_eq!(session.selected(), Some(b));
    assert_relative_eq!(session.registry().get(a).unwrap().opacity(), 1.0);
    assert_relative_eq!(session.registry().get(b).unwrap().opacity(), 0.8);
    assert_eq!(
        session.drain_events(),
        vec![SessionEvent::SelectionChanged(Some(a)), SessionEvent::SelectionChanged(Some(b))]
    );
}

#[test]
fn test_delete_selected() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    let catalog = catalog();
    let x = place(&mut session, &mut tracking, "lamp1", Vec3::zeros());
    session.drain_events();

    session.handle_action(UiAction::DeleteSelected, catalog).unwrap();
    assert_eq!(session.placed_objects().count(), 1);
    assert!(session.drain_events().is_empty());

    session.handle_touch(&TouchEvent::start(vec![touch(1, 400.0, 300.0)]));
    assert_eq!(session.gesture_mode(), GestureMode::Rotating);
    session.handle_action(UiAction::DeleteSelected, catalog).unwrap();

    assert_eq!(session.placed_objects().count(), 0);
    assert!(session.selected().is_none());
    assert_eq!(session.gesture_mode(), GestureMode::Idle);
    assert!(session.registry().pick_screen(session.camera(), Vec2::new(400.0, 300.0)).is_none());
    assert!(session.drain_events().contains(&SessionEvent::ObjectDeleted(x)));

    // A stale move after deletion touches nothing
    assert!(session.handle_touch(&TouchEvent::moved(vec![touch(1, 450.0, 300.0)])).is_none());
}

#[test]
fn test_mode_follows_touch_count() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    place(&mut session, &mut tracking, "lamp1", Vec3::zeros());

    let script = vec![
        TouchEvent::start(vec![touch(1, 400.0, 300.0)]),
        TouchEvent::moved(vec![touch(1, 420.0, 300.0)]),
        TouchEvent::start(vec![touch(1, 420.0, 300.0), touch(2, 460.0, 300.0)]),
        TouchEvent::moved(vec![touch(1, 430.0, 310.0), touch(2, 470.0, 310.0)]),
        TouchEvent::moved(vec![touch(1, 400.0, 310.0), touch(2, 500.0, 310.0)]),
        TouchEvent::start(vec![touch(1, 400.0, 310.0), touch(2, 500.0, 310.0), touch(3, 200.0, 200.0)]),
        TouchEvent::end(vec![touch(1, 400.0, 310.0), touch(2, 500.0, 310.0)]),
        TouchEvent::moved(vec![touch(1, 390.0, 310.0), touch(2, 510.0, 310.0)]),
        TouchEvent::end(vec![touch(2, 510.0, 310.0)]),
        TouchEvent::moved(vec![touch(2, 540.0, 310.0)]),
        TouchEvent::end(Vec::new()),
    ];
    let expected = [
        GestureMode::Rotating,
        GestureMode::Rotating,
        GestureMode::Dragging,
        GestureMode::Dragging,
        GestureMode::Scaling,
        GestureMode::Scaling,
        GestureMode::Scaling,
        GestureMode::Scaling,
        GestureMode::Rotating,
        GestureMode::Rotating,
        GestureMode::Idle,
    ];

    for (event, mode) in script.iter().zip(expected) {
        session.handle_touch(event);
        assert_eq!(session.gesture_mode(), mode, "after {event:?}");
    }
}

#[test]
fn test_drag_never_changes_height() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    let x = place(&mut session, &mut tracking, "lamp1", Vec3::new(0.0, 0.25, 0.0));

    session.handle_touch(&TouchEvent::start(vec![touch(1, 400.0, 300.0)]));
    session.handle_touch(&TouchEvent::start(vec![touch(1, 380.0, 300.0), touch(2, 420.0, 300.0)]));
    for step in 1..=5 {
        let dy = step as f32 * 15.0;
        session.handle_touch(&TouchEvent::moved(vec![
            touch(1, 380.0 + dy, 300.0 - dy),
            touch(2, 420.0 + dy, 300.0 - dy),
        ]));
    }

    let position = session.registry().get(x).unwrap().pose.position;
    assert_eq!(session.gesture_mode(), GestureMode::Dragging);
    assert_relative_eq!(position.y, 0.25);
    assert!(position.x > 0.0);
    assert!(position.z < 0.0);
}

#[test]
fn test_status_guidance_follows_surface() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    let mut renderer = RecordingRenderer::default();

    session.handle_action(UiAction::ShowItem(lamp("lamp1")), catalog()).unwrap();
    tracking.set_surface(Some(Vec3::zeros()));
    session.frame(&mut tracking, &mut renderer);
    session.handle_action(UiAction::Cancel, catalog()).unwrap();

    assert_eq!(
        session.drain_events(),
        vec![
            SessionEvent::PreviewChanged { visible_controls: true },
            SessionEvent::StatusChanged("Point at a surface to place the model".to_string()),
            SessionEvent::StatusChanged("Tap 'Place' to position the model".to_string()),
            SessionEvent::PreviewChanged { visible_controls: false },
            SessionEvent::StatusChanged(String::new()),
        ]
    );
}

#[test]
fn test_confirm_with_nothing_to_place_reports_status() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    place(&mut session, &mut tracking, "lamp1", Vec3::zeros());
    session.drain_events();

    assert_eq!(session.confirm(), Err(PlacementError::NoPreview));
    assert_eq!(session.status(), PlacementStatus::NoModel);
    assert_eq!(session.placed_objects().count(), 1);
    assert_eq!(
        session.drain_events(),
        vec![SessionEvent::StatusChanged("Select a model to place".to_string())]
    );

    // Repeating the confirm does not repeat the notification
    assert_eq!(session.confirm(), Err(PlacementError::NoPreview));
    assert!(session.drain_events().is_empty());
}

#[test]
fn test_unknown_item_is_an_error() {
    let mut session = session();
    let result = session.handle_action(UiAction::ShowItem(lamp("lamp9")), catalog());
    assert!(matches!(result, Err(SessionError::UnknownItem(key)) if key.name == "lamp9"));
    assert!(session.preview().is_none());
}

#[test]
fn test_unavailable_tracking_degrades_quietly() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(Some(Vec3::zeros()));
    tracking.available = false;
    let mut renderer = RecordingRenderer::default();

    session.handle_action(UiAction::ShowItem(lamp("lamp1")), catalog()).unwrap();
    for _ in 0..10 {
        session.frame(&mut tracking, &mut renderer);
    }

    assert_eq!(tracking.requests, 0);
    assert!(session.reticle().is_none());
    assert_eq!(renderer.frames.len(), 10);
    assert!(renderer.frames.iter().all(|(objects, reticle)| objects.is_empty() && !reticle));
}

#[test]
fn test_invalid_config_rejected() {
    let config = SessionConfig::default().with_viewport(0, 0);
    assert!(matches!(ArSession::new(config), Err(SessionError::Config(_))));
}

#[test]
fn test_resize_updates_picking_viewport() {
    let mut session = session();
    let mut tracking = ScriptedTracking::new(None);
    place(&mut session, &mut tracking, "lamp1", Vec3::zeros());

    session.resize(1600, 1200);
    assert_eq!(session.camera().viewport(), (1600, 1200));
    assert!(session.registry().pick_screen(session.camera(), Vec2::new(800.0, 600.0)).is_some());
}
