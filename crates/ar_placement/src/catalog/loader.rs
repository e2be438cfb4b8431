//! Ordered fallback loading
//!
//! Each item is tried against a list of `(file name, source)` strategies in
//! order. The first success wins; if every strategy fails, the individual
//! failures are reported together as one [`AssetError::AllStrategiesFailed`].

use std::fmt;
use std::path::Path;

use crate::scene::Geometry;

use super::{AssetError, CatalogKey};

/// Something that can turn a model file into geometry
pub trait ModelSource {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Load geometry from `path`
    fn load(&self, path: &Path) -> Result<Geometry, AssetError>;
}

/// One attempt: a file name inside the item directory and the source that reads it
pub struct LoadStrategy {
    /// File name joined onto the item's asset directory
    pub file_name: String,
    source: Box<dyn ModelSource>,
}

impl LoadStrategy {
    /// Create a strategy
    pub fn new(file_name: impl Into<String>, source: impl ModelSource + 'static) -> Self {
        Self {
            file_name: file_name.into(),
            source: Box::new(source),
        }
    }
}

impl fmt::Debug for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadStrategy")
            .field("file_name", &self.file_name)
            .field("source", &self.source.name())
            .finish()
    }
}

/// Tries strategies in order until one succeeds
#[derive(Debug, Default)]
pub struct FallbackLoader {
    strategies: Vec<LoadStrategy>,
}

impl FallbackLoader {
    /// Create a loader from an ordered strategy list
    pub fn new(strategies: Vec<LoadStrategy>) -> Self {
        Self { strategies }
    }

    /// Builder pattern: append a strategy
    pub fn with_strategy(mut self, strategy: LoadStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Number of strategies
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether there are no strategies
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Load the geometry for `key` from `dir`
    pub fn load(&self, key: &CatalogKey, dir: &Path) -> Result<Geometry, AssetError> {
        let mut errors = Vec::new();

        for strategy in &self.strategies {
            let path = dir.join(&strategy.file_name);
            match strategy.source.load(&path) {
                Ok(geometry) => {
                    log::debug!("Loaded {key} from {} via {}", path.display(), strategy.source.name());
                    return Ok(geometry);
                }
                Err(error) => {
                    log::debug!("{} failed for {}: {error}", strategy.source.name(), path.display());
                    errors.push(error);
                }
            }
        }

        Err(AssetError::AllStrategiesFailed {
            key: key.clone(),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Failing;

    impl ModelSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn load(&self, path: &Path) -> Result<Geometry, AssetError> {
            Err(AssetError::NotFound(path.to_path_buf()))
        }
    }

    struct Counting(Rc<Cell<usize>>);

    impl ModelSource for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn load(&self, _path: &Path) -> Result<Geometry, AssetError> {
            self.0.set(self.0.get() + 1);
            Ok(Geometry::unit_box("counted"))
        }
    }

    fn key() -> CatalogKey {
        CatalogKey::new("sofa", "sofa1")
    }

    #[test]
    fn test_first_success_wins() {
        let calls = Rc::new(Cell::new(0));
        let loader = FallbackLoader::new(vec![
            LoadStrategy::new("scene.glb", Failing),
            LoadStrategy::new("scene.gltf", Counting(calls.clone())),
            LoadStrategy::new("scene.obj", Counting(calls.clone())),
        ]);

        let geometry = loader.load(&key(), Path::new("models/sofa/sofa1")).unwrap();
        assert_eq!(geometry.name, "counted");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failures_are_aggregated_in_order() {
        let loader = FallbackLoader::new(vec![LoadStrategy::new("scene.glb", Failing)])
            .with_strategy(LoadStrategy::new("scene.gltf", Failing));

        match loader.load(&key(), Path::new("models/sofa/sofa1")) {
            Err(AssetError::AllStrategiesFailed { key: failed, errors }) => {
                assert_eq!(failed, key());
                assert_eq!(errors.len(), 2);
                assert!(matches!(&errors[1], AssetError::NotFound(p) if p.ends_with("scene.gltf")));
            }
            other => panic!("expected aggregated failure, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_loader_fails() {
        let loader = FallbackLoader::default();
        assert!(loader.is_empty());
        assert!(loader.load(&key(), Path::new(".")).is_err());
    }
}
