//! Showroom configuration
//!
//! Wraps the engine's [`SessionConfig`] with everything the demo needs to
//! run on a desktop: where model files live, which items are in the
//! catalog and how the simulated tracking session behaves.

use std::path::PathBuf;

use ar_placement::catalog::{default_entries, CatalogEntry, FallbackLoader, LoadStrategy};
use ar_placement::config::{Config, ConfigError, SessionConfig};
use serde::{Deserialize, Serialize};

use crate::assets::{ObjGeometrySource, PlaceholderSource, RonBoundsSource};

/// Root showroom configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowroomConfig {
    /// Engine settings
    pub session: SessionConfig,

    /// Model file lookup
    pub assets: AssetsConfig,

    /// Tracking simulation
    pub simulation: SimulationConfig,

    /// Catalog items, loaded in order
    pub catalog: Vec<CatalogEntry>,
}

impl Default for ShowroomConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            assets: AssetsConfig::default(),
            simulation: SimulationConfig::default(),
            catalog: default_entries(),
        }
    }
}

impl ShowroomConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;
        self.assets.validate()?;
        self.simulation.validate()?;
        if self.catalog.is_empty() {
            return Err(ConfigError::Invalid("catalog has no entries".to_string()));
        }
        for entry in &self.catalog {
            entry.validate().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }
}

impl Config for ShowroomConfig {}

/// Model file lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding `<category>/<name>/` item folders
    pub root: PathBuf,

    /// File names tried in each item folder, in order
    pub model_files: Vec<String>,

    /// Fall back to a unit box when every file fails
    pub placeholder_fallback: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets/models"),
            model_files: vec!["scene.obj".to_string(), "scene.ron".to_string()],
            placeholder_fallback: true,
        }
    }
}

impl AssetsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_files.is_empty() && !self.placeholder_fallback {
            return Err(ConfigError::Invalid("no model files and no placeholder fallback".to_string()));
        }
        for file in &self.model_files {
            source_for(file)?;
        }
        Ok(())
    }

    /// Build the ordered loader for these settings
    pub fn loader(&self) -> Result<FallbackLoader, ConfigError> {
        let mut loader = FallbackLoader::default();
        for file in &self.model_files {
            loader = match source_for(file)? {
                SourceKind::Obj => loader.with_strategy(LoadStrategy::new(file.as_str(), ObjGeometrySource)),
                SourceKind::Ron => loader.with_strategy(LoadStrategy::new(file.as_str(), RonBoundsSource)),
            };
        }
        if self.placeholder_fallback {
            loader = loader.with_strategy(LoadStrategy::new("", PlaceholderSource));
        }
        Ok(loader)
    }
}

enum SourceKind {
    Obj,
    Ron,
}

fn source_for(file: &str) -> Result<SourceKind, ConfigError> {
    if file.ends_with(".obj") {
        Ok(SourceKind::Obj)
    } else if file.ends_with(".ron") {
        Ok(SourceKind::Ron)
    } else {
        Err(ConfigError::UnsupportedFormat(file.to_string()))
    }
}

/// Tracking simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// RNG seed, fixed so runs repeat
    pub seed: u64,

    /// Whether a tracking session is running at all
    pub available: bool,

    /// Refuse hit-test source creation
    pub reject_source: bool,

    /// Polls before the hit-test source resolves
    pub source_delay_frames: u32,

    /// Maximum horizontal noise added to each hit (meters)
    pub jitter: f32,

    /// Probability that a frame reports no hit
    pub dropout_rate: f32,

    /// Height of the simulated floor
    pub floor_height: f32,

    /// Height of the viewer above the floor
    pub viewer_height: f32,

    /// Downward tilt of the viewer (degrees)
    pub viewer_pitch_degrees: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            available: true,
            reject_source: false,
            source_delay_frames: 3,
            jitter: 0.002,
            dropout_rate: 0.05,
            floor_height: 0.0,
            viewer_height: 1.4,
            viewer_pitch_degrees: 35.0,
        }
    }
}

impl SimulationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.dropout_rate) {
            return Err(ConfigError::Invalid(format!("dropout_rate {} outside [0, 1]", self.dropout_rate)));
        }
        if !(self.jitter.is_finite() && self.jitter >= 0.0) {
            return Err(ConfigError::Invalid(format!("jitter {} must be non-negative", self.jitter)));
        }
        if !(self.viewer_pitch_degrees > 0.0 && self.viewer_pitch_degrees < 90.0) {
            return Err(ConfigError::Invalid(format!(
                "viewer_pitch_degrees {} must look down at the floor",
                self.viewer_pitch_degrees
            )));
        }
        if self.viewer_height <= 0.0 {
            return Err(ConfigError::Invalid("viewer must be above the floor".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("showroom_{}_{name}", std::process::id()))
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ShowroomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.len(), 9);
    }

    #[test]
    fn test_default_loader_has_placeholder_last() {
        let loader = AssetsConfig::default().loader().unwrap();
        assert_eq!(loader.len(), 3);
    }

    #[test]
    fn test_unknown_model_format_rejected() {
        let assets = AssetsConfig {
            model_files: vec!["scene.glb".to_string()],
            ..AssetsConfig::default()
        };
        assert!(matches!(assets.validate(), Err(ConfigError::UnsupportedFormat(_))));
        assert!(assets.loader().is_err());
    }

    #[test]
    fn test_nothing_to_load_rejected() {
        let assets = AssetsConfig {
            model_files: Vec::new(),
            placeholder_fallback: false,
            ..AssetsConfig::default()
        };
        assert!(assets.validate().is_err());
    }

    #[test]
    fn test_invalid_catalog_height_rejected() {
        let mut config = ShowroomConfig::default();
        config.catalog.push(CatalogEntry::new("chair", "chair1", 0.0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_dropout_rate_range() {
        let simulation = SimulationConfig {
            dropout_rate: 1.5,
            ..SimulationConfig::default()
        };
        assert!(simulation.validate().is_err());
    }

    #[test]
    fn test_partial_toml_file_uses_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(
            &path,
            r#"
                [session.gesture]
                max_scale = 3.0

                [simulation]
                seed = 42
            "#,
        )
        .unwrap();
        let config = ShowroomConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.session.gesture.max_scale, 3.0);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.source_delay_frames, 3);
        assert_eq!(config.catalog.len(), 9);
    }

    #[test]
    fn test_ron_save_and_load() {
        let path = temp_path("roundtrip.ron");
        let mut config = ShowroomConfig::default();
        config.catalog.truncate(2);
        config.assets.placeholder_fallback = false;
        config.save_to_file(&path).unwrap();

        let loaded = ShowroomConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.catalog, config.catalog);
        assert!(!loaded.assets.placeholder_fallback);
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/showroom.toml");
        let config = ShowroomConfig::load_from_file(path).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.session.logging.filter, "info,showroom=debug");
        assert_eq!(config.catalog.len(), 9);
    }
}
