//! # Session Configuration
//!
//! Tuning parameters for one AR placement session. Every threshold the
//! gesture and placement logic depends on lives here rather than in code,
//! so hosts can adjust them per device.
//!
//! ## Configuration Categories
//!
//! - **Gesture Config**: Rotation speed, movement thresholds, scale limits
//! - **Placement Config**: Preview/placed/selected opacity, empty-tap policy
//! - **Camera Config**: Projection parameters for picking rays
//! - **Viewport Config**: Screen size in device pixels
//! - **Logging Config**: Default log filter

use serde::{Serialize, Deserialize};

use super::{Config, ConfigError};

/// What a one-finger tap on empty space does to the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTapPolicy {
    /// Clear the selection
    Deselect,
    /// Leave the selection unchanged
    KeepSelection,
}

/// # Gesture Configuration
///
/// Thresholds and speeds used by the gesture state machine. Distances are in
/// device pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Yaw applied per pixel of horizontal movement (radians)
    pub rotation_speed: f32,
    /// Distance a single touch must travel before rotation commits
    pub move_threshold_px: f32,
    /// Initial inter-touch distance below which two fingers drag instead of scale
    pub drag_scale_threshold_px: f32,
    /// Inter-touch distance change needed before a pinch scales or a drag turns into a pinch
    pub pinch_deadzone_px: f32,
    /// World units per pixel when dragging without a tracked surface
    pub movement_speed: f32,
    /// Smallest allowed uniform scale
    pub min_scale: f32,
    /// Largest allowed uniform scale
    pub max_scale: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 0.01,
            move_threshold_px: 3.0,
            drag_scale_threshold_px: 100.0,
            pinch_deadzone_px: 10.0,
            movement_speed: 0.002,
            min_scale: 0.5,
            max_scale: 2.0,
        }
    }
}

impl GestureConfig {
    /// Set scale limits
    pub fn with_scale_limits(mut self, min_scale: f32, max_scale: f32) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Set the drag/scale classification distance
    pub fn with_drag_scale_threshold(mut self, threshold_px: f32) -> Self {
        self.drag_scale_threshold_px = threshold_px;
        self
    }

    /// Clamp a scale into the configured limits
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("rotation_speed", self.rotation_speed),
            ("movement_speed", self.movement_speed),
            ("drag_scale_threshold_px", self.drag_scale_threshold_px),
            ("min_scale", self.min_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if !(self.move_threshold_px >= 0.0 && self.pinch_deadzone_px >= 0.0) {
            return Err(ConfigError::Invalid("movement thresholds cannot be negative".to_string()));
        }

        if !self.max_scale.is_finite() || self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid(format!(
                "scale range [{}, {}] is empty",
                self.min_scale, self.max_scale
            )));
        }

        Ok(())
    }
}

/// # Placement Configuration
///
/// Visual states of preview, placed and selected objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Opacity of the preview object
    pub preview_opacity: f32,
    /// Opacity of placed, unselected objects
    pub placed_opacity: f32,
    /// Opacity of the selected object
    pub selected_opacity: f32,
    /// Behaviour of a tap that hits no placed object
    pub empty_tap: EmptyTapPolicy,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            preview_opacity: 0.5,
            placed_opacity: 1.0,
            selected_opacity: 0.8,
            empty_tap: EmptyTapPolicy::Deselect,
        }
    }
}

impl PlacementConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("preview_opacity", self.preview_opacity),
            ("placed_opacity", self.placed_opacity),
            ("selected_opacity", self.selected_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        Ok(())
    }
}

/// # Camera Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 70.0,
            near: 0.01,
            far: 20.0,
        }
    }
}

impl CameraConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!("fov_y_degrees {} outside (0, 180)", self.fov_y_degrees)));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes near={} far={} are invalid",
                self.near, self.far
            )));
        }
        Ok(())
    }
}

/// # Viewport Configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in device pixels
    pub width: u32,
    /// Height in device pixels
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `env_logger` filter, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// # Session Configuration
///
/// Root configuration for an [`ArSession`](crate::ArSession).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Gesture thresholds and speeds
    pub gesture: GestureConfig,
    /// Preview and selection visuals
    pub placement: PlacementConfig,
    /// Camera projection
    pub camera: CameraConfig,
    /// Screen size
    pub viewport: ViewportConfig,
    /// Logging defaults
    pub logging: LoggingConfig,
}

impl SessionConfig {
    /// Builder pattern: set gesture configuration
    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    /// Builder pattern: set placement configuration
    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    /// Builder pattern: set viewport size
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = ViewportConfig { width, height };
        self
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture.validate()?;
        self.placement.validate()?;
        self.camera.validate()?;
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid("viewport must be non-empty".to_string()));
        }
        Ok(())
    }
}

impl Config for SessionConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_scale_range_rejected() {
        let config = SessionConfig::default()
            .with_gesture(GestureConfig::default().with_scale_limits(2.0, 0.5));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_opacity_out_of_range_rejected() {
        let placement = PlacementConfig {
            selected_opacity: 1.5,
            ..PlacementConfig::default()
        };
        assert!(placement.validate().is_err());
    }

    #[test]
    fn test_zero_viewport_rejected() {
        assert!(SessionConfig::default().with_viewport(0, 100).validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let source = r#"
            [gesture]
            max_scale = 3.0

            [placement]
            empty_tap = "keep_selection"
        "#;
        let config: SessionConfig = toml::from_str(source).unwrap();

        assert_eq!(config.gesture.max_scale, 3.0);
        assert_eq!(config.gesture.min_scale, 0.5);
        assert_eq!(config.placement.empty_tap, EmptyTapPolicy::KeepSelection);
        assert_eq!(config.camera.fov_y_degrees, 70.0);
    }

    #[test]
    fn test_ron_roundtrip_through_files() {
        let path = std::env::temp_dir().join(format!("ar_placement_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let mut config = SessionConfig::default();
        config.gesture.rotation_speed = 0.02;
        config.save_to_file(&path).unwrap();
        let loaded = SessionConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.gesture.rotation_speed, 0.02);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = SessionConfig::load_from_file("settings.json");
        assert!(matches!(result, Err(ConfigError::Io(_)) | Err(ConfigError::UnsupportedFormat(_))));
    }
}
