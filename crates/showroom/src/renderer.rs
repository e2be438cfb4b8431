//! Logging render surface
//!
//! The showroom has no GPU output; frames are summarized to the log
//! instead. A summary line is written whenever the visible content changes.

use ar_placement::render::{RenderFrame, RenderSurface};

/// What changed between frames, as far as the log cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    /// Objects drawn, placed ones first
    pub objects: Vec<String>,
    /// Objects drawn with alpha blending
    pub transparent: usize,
    /// Whether the surface reticle is shown
    pub reticle: bool,
}

impl FrameSummary {
    fn from_frame(frame: &RenderFrame<'_>) -> Self {
        Self {
            objects: frame.objects.iter().map(|object| object.item().to_string()).collect(),
            transparent: frame.transparent_count(),
            reticle: frame.reticle.is_some(),
        }
    }
}

/// [`RenderSurface`] that writes frame summaries to the log
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
    last: Option<FrameSummary>,
}

impl LogRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Summary of the most recent frame
    pub fn last_summary(&self) -> Option<&FrameSummary> {
        self.last.as_ref()
    }
}

impl RenderSurface for LogRenderer {
    fn render_frame(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        let summary = FrameSummary::from_frame(frame);

        if self.last.as_ref() != Some(&summary) {
            log::info!(
                "Frame {}: [{}] ({} transparent), reticle {}",
                self.frames,
                summary.objects.join(", "),
                summary.transparent,
                if summary.reticle { "shown" } else { "hidden" }
            );
            self.last = Some(summary);
        } else {
            log::trace!("Frame {} unchanged", self.frames);
        }
    }
}
