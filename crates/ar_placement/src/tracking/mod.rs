//! Surface tracking
//!
//! Wraps the environment-tracking session behind [`TrackingSession`] and
//! reduces its per-frame hit-test results to one [`SurfaceSample`].
//!
//! The hit-test source is requested lazily on the first sample and only once
//! per tracker. Until it resolves every sample is invalid; nothing blocks.
//!
//! ```text
//! Unrequested ──request──▶ Pending ──poll──▶ Ready(id)
//!      │                      │
//!      └───── rejected ───────┴──────────▶ Failed   (valid=false forever)
//! ```

use thiserror::Error;

use crate::foundation::math::{Mat4, Pose};

/// Tracking session errors
///
/// These never propagate out of the tracker; they degrade to invalid samples.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    /// No tracking session is running
    #[error("Tracking session unavailable")]
    SessionUnavailable,

    /// The session refused to create a hit-test source
    #[error("Hit-test source rejected: {0}")]
    SourceRejected(String),
}

/// Handle to a hit-test source owned by the tracking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTestSourceId(pub u32);

/// Resolution state of a requested hit-test source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    /// Still resolving
    Pending,
    /// Ready for queries
    Ready(HitTestSourceId),
    /// Resolution failed
    Failed(TrackingError),
}

/// One hit-test result, closest first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTestResult {
    /// Pose of the hit as a 4x4 transform
    pub transform: Mat4,
}

impl HitTestResult {
    /// Wrap a transform
    pub fn new(transform: Mat4) -> Self {
        Self { transform }
    }

    /// Position and orientation of the hit, `None` for a degenerate transform
    pub fn pose(&self) -> Option<Pose> {
        Pose::from_matrix(&self.transform)
    }
}

/// Environment-tracking session provided by the host platform
pub trait TrackingSession {
    /// Whether a session is currently running
    fn is_available(&self) -> bool;

    /// Start asynchronous creation of a viewer-space hit-test source
    fn request_hit_test_source(&mut self) -> Result<(), TrackingError>;

    /// Check on a previously requested source
    fn poll_hit_test_source(&mut self) -> SourceStatus;

    /// Hit-test results for the current frame, closest first
    fn hit_test_results(&mut self, source: HitTestSourceId) -> Vec<HitTestResult>;

    /// Current viewer pose, if the session reports one
    fn viewer_pose(&self) -> Option<Pose> {
        None
    }
}

/// One frame's surface detection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    /// Surface pose; meaningless when `valid` is false
    pub pose: Pose,
    /// Whether a surface was detected this frame
    pub valid: bool,
}

impl SurfaceSample {
    /// A detected surface
    pub fn detected(pose: Pose) -> Self {
        Self { pose, valid: true }
    }

    /// No surface this frame
    pub fn invalid() -> Self {
        Self {
            pose: Pose::identity(),
            valid: false,
        }
    }

    /// The pose if valid
    pub fn pose(&self) -> Option<Pose> {
        self.valid.then_some(self.pose)
    }
}

impl Default for SurfaceSample {
    fn default() -> Self {
        Self::invalid()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceState {
    Unrequested,
    Pending,
    Ready(HitTestSourceId),
    Failed,
}

/// Produces one [`SurfaceSample`] per frame
#[derive(Debug)]
pub struct SurfaceTracker {
    state: SourceState,
    latest: SurfaceSample,
}

impl SurfaceTracker {
    /// Create a tracker that has not requested a source yet
    pub fn new() -> Self {
        Self {
            state: SourceState::Unrequested,
            latest: SurfaceSample::invalid(),
        }
    }

    /// Sample the surface for this frame
    ///
    /// Call once per rendered frame after the session has resolved the
    /// frame's hit tests.
    pub fn sample(&mut self, session: &mut dyn TrackingSession) -> SurfaceSample {
        self.latest = self.resolve(session);
        self.latest
    }

    fn resolve(&mut self, session: &mut dyn TrackingSession) -> SurfaceSample {
        if !session.is_available() {
            return SurfaceSample::invalid();
        }

        if self.state == SourceState::Unrequested {
            match session.request_hit_test_source() {
                Ok(()) => {
                    log::info!("Hit-test source requested");
                    self.state = SourceState::Pending;
                }
                Err(error) => {
                    self.fail(&error);
                    return SurfaceSample::invalid();
                }
            }
        }

        if self.state == SourceState::Pending {
            match session.poll_hit_test_source() {
                SourceStatus::Pending => return SurfaceSample::invalid(),
                SourceStatus::Ready(id) => {
                    log::info!("Hit-test source ready: {id:?}");
                    self.state = SourceState::Ready(id);
                }
                SourceStatus::Failed(error) => {
                    self.fail(&error);
                    return SurfaceSample::invalid();
                }
            }
        }

        let SourceState::Ready(id) = self.state else {
            return SurfaceSample::invalid();
        };

        match session.hit_test_results(id).first().map(HitTestResult::pose) {
            Some(Some(pose)) => {
                log::trace!("Surface at {:?}", pose.position);
                SurfaceSample::detected(pose)
            }
            Some(None) => {
                log::trace!("Discarding degenerate hit-test pose");
                SurfaceSample::invalid()
            }
            None => SurfaceSample::invalid(),
        }
    }

    fn fail(&mut self, error: &TrackingError) {
        log::warn!("Surface tracking disabled: {error}");
        self.state = SourceState::Failed;
    }

    /// The sample from the most recent frame
    pub fn latest(&self) -> SurfaceSample {
        self.latest
    }

    /// Whether the hit-test source has resolved
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SourceState::Ready(_))
    }

    /// Whether the hit-test source failed for good
    pub fn has_failed(&self) -> bool {
        self.state == SourceState::Failed
    }
}

impl Default for SurfaceTracker {
    fn default() -> Self {
        Self::new()
    }
}
