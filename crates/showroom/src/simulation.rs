//! Simulated tracking session
//!
//! Stands in for a device tracking session: a viewer hovering above a flat
//! floor, a hit-test source that takes a few frames to resolve, and hits
//! that wobble and occasionally drop out. Seeded, so every run is the same.

use ar_placement::foundation::math::{utils, Pose, Quat, Vec3};
use ar_placement::spatial::{Plane, Ray};
use ar_placement::tracking::{HitTestResult, HitTestSourceId, SourceStatus, TrackingError, TrackingSession};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimulatedSource {
    None,
    Resolving { remaining: u32 },
    Ready(HitTestSourceId),
}

/// Deterministic [`TrackingSession`] over a flat floor
#[derive(Debug)]
pub struct SimulatedTracking {
    config: SimulationConfig,
    rng: StdRng,
    source: SimulatedSource,
    next_source: u32,
    viewer: Pose,
    frames: u64,
}

impl SimulatedTracking {
    /// Create a session with the viewer at the origin facing -Z
    pub fn new(config: &SimulationConfig) -> Self {
        let pitch = Quat::from_axis_angle(&Vec3::x_axis(), -utils::deg_to_rad(config.viewer_pitch_degrees));
        let viewer = Pose::new(Vec3::new(0.0, config.floor_height + config.viewer_height, 0.0), pitch);

        Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(config.seed),
            source: SimulatedSource::None,
            next_source: 1,
            viewer,
            frames: 0,
        }
    }

    /// Current viewer pose
    pub fn viewer(&self) -> Pose {
        self.viewer
    }

    /// Turn the viewer about the world Y axis
    pub fn turn(&mut self, angle: f32) {
        self.viewer.rotate_yaw(angle);
        log::debug!("Simulated viewer turned by {angle:.2} rad");
    }

    /// Frames for which hit-test results were requested
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Where the viewer's line of sight meets the floor
    pub fn gaze_point(&self) -> Option<Vec3> {
        let forward = self.viewer.orientation * -Vec3::z();
        let ray = Ray::new(self.viewer.position, forward)?;
        Plane::horizontal(self.config.floor_height).intersect_ray(&ray)
    }

    fn jitter(&mut self) -> f32 {
        let amount = self.config.jitter;
        if amount > 0.0 {
            self.rng.gen_range(-amount..=amount)
        } else {
            0.0
        }
    }
}

impl TrackingSession for SimulatedTracking {
    fn is_available(&self) -> bool {
        self.config.available
    }

    fn request_hit_test_source(&mut self) -> Result<(), TrackingError> {
        if !self.config.available {
            return Err(TrackingError::SessionUnavailable);
        }
        if self.config.reject_source {
            return Err(TrackingError::SourceRejected("simulated rejection".to_string()));
        }
        self.source = SimulatedSource::Resolving {
            remaining: self.config.source_delay_frames,
        };
        log::debug!("Simulated hit-test source resolving in {} frames", self.config.source_delay_frames);
        Ok(())
    }

    fn poll_hit_test_source(&mut self) -> SourceStatus {
        match self.source {
            SimulatedSource::None => SourceStatus::Failed(TrackingError::SourceRejected("never requested".to_string())),
            SimulatedSource::Resolving { remaining: 0 } => {
                let id = HitTestSourceId(self.next_source);
                self.next_source += 1;
                self.source = SimulatedSource::Ready(id);
                SourceStatus::Ready(id)
            }
            SimulatedSource::Resolving { remaining } => {
                self.source = SimulatedSource::Resolving { remaining: remaining - 1 };
                SourceStatus::Pending
            }
            SimulatedSource::Ready(id) => SourceStatus::Ready(id),
        }
    }

    fn hit_test_results(&mut self, source: HitTestSourceId) -> Vec<HitTestResult> {
        self.frames += 1;
        if self.source != SimulatedSource::Ready(source) {
            return Vec::new();
        }
        if self.rng.gen::<f32>() < self.config.dropout_rate {
            log::trace!("Simulated dropout on frame {}", self.frames);
            return Vec::new();
        }

        let Some(point) = self.gaze_point() else {
            return Vec::new();
        };
        let offset = Vec3::new(self.jitter(), 0.0, self.jitter());
        let surface = Pose::new(point + offset, Quat::identity());
        vec![HitTestResult::new(surface.to_matrix())]
    }

    fn viewer_pose(&self) -> Option<Pose> {
        self.config.available.then_some(self.viewer)
    }
}
