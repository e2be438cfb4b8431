//! Scripted interaction run
//!
//! Drives an [`ArSession`] the way a user would: pick an item, wait for a
//! surface, place it, then tap, swipe, pinch and drag placed objects.
//! Touch gestures are aimed at the selected object's on-screen position.

use ar_placement::catalog::{Catalog, CatalogKey};
use ar_placement::events::{SessionEvent, SessionEventHandler};
use ar_placement::foundation::math::Vec2;
use ar_placement::input::{TouchEvent, TouchPoint};
use ar_placement::{ArSession, SessionError, UiAction};

use crate::renderer::LogRenderer;
use crate::simulation::SimulatedTracking;

/// One scripted user action
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Run this many frames
    Frames(u32),
    /// Tap a catalog thumbnail
    Show(CatalogKey),
    /// Tap "Place"
    Confirm,
    /// Tap "Cancel"
    Cancel,
    /// Tap "Delete"
    Delete,
    /// Turn the viewer (radians about world Y)
    Turn(f32),
    /// Tap the n-th placed object
    TapObject(usize),
    /// Tap the top-left corner of the screen
    TapEmpty,
    /// One-finger horizontal swipe
    Swipe {
        /// Total horizontal travel in pixels
        dx: f32,
        /// Move events
        steps: u32,
    },
    /// Two-finger pinch
    Pinch {
        /// Initial finger distance in pixels
        from: f32,
        /// Final finger distance in pixels
        to: f32,
        /// Move events
        steps: u32,
    },
    /// Two fingers held close together and moved
    Drag {
        /// Total horizontal travel in pixels
        dx: f32,
        /// Total vertical travel in pixels
        dy: f32,
        /// Move events
        steps: u32,
    },
}

/// Finger distance for two-finger drags, below the drag/scale threshold
const DRAG_SPREAD_PX: f32 = 40.0;

/// The stock demo: place two items, manipulate one, delete the other
pub fn demo(catalog: &Catalog) -> Vec<Step> {
    let keys = catalog.keys();
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return Vec::new();
    };
    let second = keys[keys.len() / 2];

    vec![
        Step::Frames(6),
        Step::Show((*first).clone()),
        Step::Frames(2),
        Step::Confirm,
        Step::Turn(0.25),
        Step::Frames(2),
        Step::Show(second.clone()),
        Step::Frames(2),
        Step::Confirm,
        Step::TapObject(0),
        Step::Swipe { dx: 120.0, steps: 6 },
        Step::Pinch { from: 120.0, to: 180.0, steps: 4 },
        Step::Drag { dx: 30.0, dy: -20.0, steps: 5 },
        Step::TapObject(1),
        Step::Delete,
        Step::Show((*last).clone()),
        Step::Frames(2),
        Step::Cancel,
        Step::TapEmpty,
        Step::Frames(2),
    ]
}

/// Outcome of a scripted run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Steps executed
    pub steps: usize,
    /// Frames rendered
    pub frames: u64,
    /// Objects left in the scene
    pub placed: usize,
    /// Session notifications delivered
    pub events: usize,
}

/// Logs guidance text as the status line would show it
#[derive(Debug, Default)]
pub struct StatusLine;

impl SessionEventHandler for StatusLine {
    fn on_event(&mut self, event: &SessionEvent) -> bool {
        if let SessionEvent::StatusChanged(message) = event {
            if message.is_empty() {
                log::info!("Status cleared");
            } else {
                log::info!("Status: {message}");
            }
        }
        false
    }
}

/// Plays [`Step`]s against a session
pub struct ScriptRunner<'a> {
    session: &'a mut ArSession,
    tracking: &'a mut SimulatedTracking,
    renderer: &'a mut LogRenderer,
    catalog: &'a Catalog,
    next_touch: u64,
    events: usize,
}

impl<'a> ScriptRunner<'a> {
    /// Create a runner
    pub fn new(
        session: &'a mut ArSession,
        tracking: &'a mut SimulatedTracking,
        renderer: &'a mut LogRenderer,
        catalog: &'a Catalog,
    ) -> Self {
        Self {
            session,
            tracking,
            renderer,
            catalog,
            next_touch: 0,
            events: 0,
        }
    }

    /// Run every step in order
    pub fn run(&mut self, steps: &[Step]) -> Result<RunReport, SessionError> {
        for (index, step) in steps.iter().enumerate() {
            log::debug!("Step {}: {step:?}", index + 1);
            self.step(step)?;
            self.drain();
        }

        Ok(RunReport {
            steps: steps.len(),
            frames: self.renderer.frames(),
            placed: self.session.placed_objects().count(),
            events: self.events,
        })
    }

    fn step(&mut self, step: &Step) -> Result<(), SessionError> {
        match step {
            Step::Frames(count) => {
                for _ in 0..*count {
                    self.session.frame(&mut *self.tracking, &mut *self.renderer);
                }
            }
            Step::Show(key) => self.session.handle_action(UiAction::ShowItem(key.clone()), self.catalog)?,
            Step::Confirm => self.session.handle_action(UiAction::Confirm, self.catalog)?,
            Step::Cancel => self.session.handle_action(UiAction::Cancel, self.catalog)?,
            Step::Delete => self.session.handle_action(UiAction::DeleteSelected, self.catalog)?,
            Step::Turn(angle) => self.tracking.turn(*angle),
            Step::TapObject(index) => {
                let target = self
                    .session
                    .placed_objects()
                    .nth(*index)
                    .and_then(|(_, object)| self.session.camera().world_to_screen(object.pose.position));
                match target {
                    Some(point) => self.tap(point),
                    None => log::warn!("No placed object #{index} on screen"),
                }
            }
            Step::TapEmpty => self.tap(Vec2::new(1.0, 1.0)),
            Step::Swipe { dx, steps } => self.swipe(*dx, *steps),
            Step::Pinch { from, to, steps } => self.pinch(*from, *to, *steps),
            Step::Drag { dx, dy, steps } => self.drag(Vec2::new(*dx, *dy), *steps),
        }
        Ok(())
    }

    fn drain(&mut self) {
        for event in self.session.drain_events() {
            log::debug!("Event: {event:?}");
            self.events += 1;
        }
    }

    /// Screen position of the selected object, or the screen centre
    fn anchor(&self) -> Vec2 {
        let camera = self.session.camera();
        let selected = self
            .session
            .selected()
            .and_then(|id| self.session.registry().get(id))
            .and_then(|object| camera.world_to_screen(object.pose.position));

        selected.unwrap_or_else(|| {
            let (width, height) = camera.viewport();
            Vec2::new(width as f32 * 0.5, height as f32 * 0.5)
        })
    }

    fn touch_ids(&mut self, count: u64) -> u64 {
        let first = self.next_touch;
        self.next_touch += count;
        first
    }

    fn tap(&mut self, point: Vec2) {
        let id = self.touch_ids(1);
        self.session.handle_touch(&TouchEvent::start(vec![TouchPoint::new(id, point.x, point.y)]));
        self.session.handle_touch(&TouchEvent::end(Vec::new()));
    }

    fn swipe(&mut self, dx: f32, steps: u32) {
        let start = self.anchor();
        let id = self.touch_ids(1);
        self.session.handle_touch(&TouchEvent::start(vec![TouchPoint::new(id, start.x, start.y)]));
        for i in 1..=steps.max(1) {
            let x = start.x + dx * i as f32 / steps.max(1) as f32;
            self.session.handle_touch(&TouchEvent::moved(vec![TouchPoint::new(id, x, start.y)]));
        }
        self.session.handle_touch(&TouchEvent::end(Vec::new()));
    }

    fn pair(ids: u64, center: Vec2, spread: f32) -> Vec<TouchPoint> {
        let half = spread * 0.5;
        vec![
            TouchPoint::new(ids, center.x - half, center.y),
            TouchPoint::new(ids + 1, center.x + half, center.y),
        ]
    }

    fn pinch(&mut self, from: f32, to: f32, steps: u32) {
        let center = self.anchor();
        let ids = self.touch_ids(2);
        self.session.handle_touch(&TouchEvent::start(Self::pair(ids, center, from)));
        for i in 1..=steps.max(1) {
            let spread = from + (to - from) * i as f32 / steps.max(1) as f32;
            self.session.handle_touch(&TouchEvent::moved(Self::pair(ids, center, spread)));
        }
        self.session.handle_touch(&TouchEvent::end(Vec::new()));
    }

    fn drag(&mut self, travel: Vec2, steps: u32) {
        let start = self.anchor();
        let ids = self.touch_ids(2);
        self.session.handle_touch(&TouchEvent::start(Self::pair(ids, start, DRAG_SPREAD_PX)));
        for i in 1..=steps.max(1) {
            let center = start + travel * (i as f32 / steps.max(1) as f32);
            self.session.handle_touch(&TouchEvent::moved(Self::pair(ids, center, DRAG_SPREAD_PX)));
        }
        self.session.handle_touch(&TouchEvent::end(Vec::new()));
    }
}
