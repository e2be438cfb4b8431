//! Furniture catalog
//!
//! Items are addressed by a structured `(category, name)` key and validated
//! when the catalog is built. Geometry for every item is loaded once through
//! a [`FallbackLoader`] and normalized to the item's canonical height.
//!
//! A failing item is logged and skipped; the rest of the catalog still loads.

mod loader;

pub use loader::{FallbackLoader, LoadStrategy, ModelSource};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::Geometry;

/// Asset loading and catalog validation errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Parsed geometry is unusable
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Catalog entry failed validation
    #[error("Invalid catalog entry: {0}")]
    InvalidEntry(String),

    /// Two catalog entries share a key
    #[error("Duplicate catalog entry: {0}")]
    DuplicateEntry(CatalogKey),

    /// Asset file does not exist
    #[error("Asset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Every load strategy for an item failed
    #[error("All {} load strategies failed for {key}", .errors.len())]
    AllStrategiesFailed {
        /// Item being loaded
        key: CatalogKey,
        /// One error per strategy, in the order tried
        errors: Vec<AssetError>,
    },
}

/// Structured catalog key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogKey {
    /// Item category, e.g. `"sofa"`
    pub category: String,
    /// Item name within the category, e.g. `"sofa1"`
    pub name: String,
}

impl CatalogKey {
    /// Create a key
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }

    /// Asset directory for this item below `root`
    pub fn asset_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.category).join(&self.name)
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Catalog entry as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Item category
    pub category: String,
    /// Item name
    pub name: String,
    /// Canonical display height in metres
    pub height: f32,
}

impl CatalogEntry {
    /// Create an entry
    pub fn new(category: impl Into<String>, name: impl Into<String>, height: f32) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            height,
        }
    }

    /// Structured key for this entry
    pub fn key(&self) -> CatalogKey {
        CatalogKey::new(self.category.clone(), self.name.clone())
    }

    /// Check names and height
    pub fn validate(&self) -> Result<(), AssetError> {
        let valid_segment = |s: &str| !s.trim().is_empty() && !s.contains(['/', '\\']) && s != "..";
        if !valid_segment(&self.category) || !valid_segment(&self.name) {
            return Err(AssetError::InvalidEntry(format!(
                "'{}/{}' is not a valid item key",
                self.category, self.name
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(AssetError::InvalidEntry(format!(
                "{} has non-positive height {}",
                self.key(),
                self.height
            )));
        }
        Ok(())
    }
}

/// The stock furniture catalog: three lamps, three sofas and three tables
pub fn default_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("lamp", "lamp1", 0.3),
        CatalogEntry::new("lamp", "lamp2", 0.35),
        CatalogEntry::new("lamp", "lamp3", 0.28),
        CatalogEntry::new("sofa", "sofa1", 0.1),
        CatalogEntry::new("sofa", "sofa2", 0.12),
        CatalogEntry::new("sofa", "sofa3", 0.15),
        CatalogEntry::new("table", "table1", 0.2),
        CatalogEntry::new("table", "table2", 0.25),
        CatalogEntry::new("table", "table3", 0.22),
    ]
}

/// A loaded catalog item
#[derive(Debug, Clone)]
pub struct CatalogItem {
    /// Item key
    pub key: CatalogKey,
    /// Canonical display height
    pub height: f32,
    /// Geometry normalized to `height`, shared by every instance
    pub geometry: Arc<Geometry>,
}

/// Loaded items by key
#[derive(Debug, Default)]
pub struct Catalog {
    items: HashMap<CatalogKey, CatalogItem>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every entry, skipping the ones that fail
    ///
    /// Returns the catalog together with one error per skipped entry.
    pub fn load(entries: &[CatalogEntry], loader: &FallbackLoader, root: &Path) -> (Self, Vec<AssetError>) {
        let mut catalog = Self::new();
        let mut failures = Vec::new();

        for entry in entries {
            match catalog.load_entry(entry, loader, root) {
                Ok(()) => log::debug!("Loaded catalog item {}", entry.key()),
                Err(error) => {
                    log::error!("Error loading model {}/{}: {error}", entry.category, entry.name);
                    if let AssetError::AllStrategiesFailed { errors, .. } = &error {
                        for cause in errors {
                            log::warn!("  caused by: {cause}");
                        }
                    }
                    failures.push(error);
                }
            }
        }

        log::info!("Catalog loaded: {} items, {} skipped", catalog.len(), failures.len());
        (catalog, failures)
    }

    fn load_entry(&mut self, entry: &CatalogEntry, loader: &FallbackLoader, root: &Path) -> Result<(), AssetError> {
        entry.validate()?;
        let key = entry.key();
        if self.items.contains_key(&key) {
            return Err(AssetError::DuplicateEntry(key));
        }
        let geometry = loader.load(&key, &key.asset_dir(root))?.normalized(entry.height)?;
        self.insert(CatalogItem {
            key,
            height: entry.height,
            geometry: Arc::new(geometry),
        })
    }

    /// Add an already loaded item
    pub fn insert(&mut self, item: CatalogItem) -> Result<(), AssetError> {
        if self.items.contains_key(&item.key) {
            return Err(AssetError::DuplicateEntry(item.key));
        }
        self.items.insert(item.key.clone(), item);
        Ok(())
    }

    /// Look up an item
    pub fn get(&self, key: &CatalogKey) -> Option<&CatalogItem> {
        self.items.get(key)
    }

    /// Whether an item is loaded
    pub fn contains(&self, key: &CatalogKey) -> bool {
        self.items.contains_key(key)
    }

    /// Loaded keys in sorted order
    pub fn keys(&self) -> Vec<&CatalogKey> {
        let mut keys: Vec<_> = self.items.keys().collect();
        keys.sort();
        keys
    }

    /// Number of loaded items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are loaded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
