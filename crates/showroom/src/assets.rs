//! Model file sources
//!
//! Three [`ModelSource`]s the showroom chains together per catalog item:
//! Wavefront OBJ files, RON part-bounds lists and a placeholder box.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ar_placement::catalog::{AssetError, ModelSource};
use ar_placement::foundation::math::Vec3;
use ar_placement::scene::{Geometry, GeometryPart};
use ar_placement::spatial::Aabb;
use serde::Deserialize;

/// Model name for an item path: the name of the item folder
fn model_name(path: &Path) -> String {
    let folder = if path.extension().is_some() { path.parent() } else { Some(path) };
    folder
        .and_then(Path::file_name)
        .map_or_else(|| "model".to_string(), |name| name.to_string_lossy().to_string())
}

fn require_file(path: &Path) -> Result<(), AssetError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AssetError::NotFound(path.to_path_buf()))
    }
}

/// Reads part bounds from Wavefront OBJ files
///
/// Every `o`/`g` group becomes one part bounded by the vertices its faces
/// use. Files without faces become a single part around all vertices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjGeometrySource;

impl ModelSource for ObjGeometrySource {
    fn name(&self) -> &str {
        "obj"
    }

    fn load(&self, path: &Path) -> Result<Geometry, AssetError> {
        require_file(path)?;
        let file = File::open(path)?;
        parse_obj(&model_name(path), BufReader::new(file))
    }
}

struct PartBuilder {
    name: String,
    bounds: Option<Aabb>,
}

impl PartBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bounds: None,
        }
    }

    fn include(&mut self, point: Vec3) {
        let point_box = Aabb::new(point, point);
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.union(&point_box),
            None => point_box,
        });
    }

    fn finish(self) -> Option<GeometryPart> {
        self.bounds.map(|bounds| GeometryPart::new(self.name, bounds))
    }
}

/// Parse OBJ text into per-group bounds
pub fn parse_obj<R: BufRead>(name: &str, reader: R) -> Result<Geometry, AssetError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut parts = Vec::new();
    let mut current = PartBuilder::new(name);

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_number = index + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens[0] {
            "o" | "g" => {
                let group = tokens.get(1).copied().unwrap_or("unnamed");
                if let Some(part) = std::mem::replace(&mut current, PartBuilder::new(group)).finish() {
                    parts.push(part);
                }
            }
            "v" => {
                if tokens.len() < 4 {
                    return Err(AssetError::Parse(format!(
                        "line {line_number}: vertex needs three coordinates"
                    )));
                }
                let coord = |token: &str| {
                    token
                        .parse::<f32>()
                        .map_err(|e| AssetError::Parse(format!("line {line_number}: {e}")))
                };
                positions.push(Vec3::new(coord(tokens[1])?, coord(tokens[2])?, coord(tokens[3])?));
            }
            "f" => {
                for vertex in &tokens[1..] {
                    let index = resolve_index(vertex, positions.len(), line_number)?;
                    current.include(positions[index]);
                }
            }
            _ => {
                // Normals, texture coordinates and materials do not affect bounds
            }
        }
    }

    if let Some(part) = current.finish() {
        parts.push(part);
    }

    if parts.is_empty() {
        if let Some(bounds) = Aabb::from_points(positions.iter().copied()) {
            parts.push(GeometryPart::new(name, bounds));
        }
    }

    log::debug!("Parsed OBJ '{name}': {} vertices, {} parts", positions.len(), parts.len());
    Geometry::new(name, parts)
}

/// Resolve a face vertex (`v`, `v/vt`, `v//vn` or `v/vt/vn`) to a position index
fn resolve_index(vertex: &str, count: usize, line_number: usize) -> Result<usize, AssetError> {
    let position = vertex.split('/').next().unwrap_or_default();
    let raw: i64 = position
        .parse()
        .map_err(|e| AssetError::Parse(format!("line {line_number}: bad face index '{vertex}': {e}")))?;

    // OBJ indices are 1-based; negative indices count back from the newest vertex
    let resolved = match raw {
        i if i > 0 => usize::try_from(i - 1).ok(),
        i if i < 0 => usize::try_from(i.unsigned_abs()).ok().and_then(|back| count.checked_sub(back)),
        _ => None,
    };

    resolved.filter(|&i| i < count).ok_or_else(|| {
        AssetError::Parse(format!(
            "line {line_number}: face index {raw} out of range for {count} vertices"
        ))
    })
}

#[derive(Debug, Deserialize)]
struct PartRecord {
    name: String,
    min: [f32; 3],
    max: [f32; 3],
}

/// Reads precomputed part bounds from a RON list
///
/// ```ron
/// [
///     (name: "base", min: (-0.5, 0.0, -0.5), max: (0.5, 0.1, 0.5)),
///     (name: "shade", min: (-0.3, 0.8, -0.3), max: (0.3, 1.2, 0.3)),
/// ]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RonBoundsSource;

impl RonBoundsSource {
    /// Parse RON text
    pub fn parse(name: &str, contents: &str) -> Result<Geometry, AssetError> {
        let records: Vec<PartRecord> = ron::from_str(contents).map_err(|e| AssetError::Parse(e.to_string()))?;

        let parts = records
            .into_iter()
            .map(|record| {
                let min = Vec3::from(record.min);
                let max = Vec3::from(record.max);
                if min.iter().zip(max.iter()).any(|(lo, hi)| lo > hi) {
                    return Err(AssetError::InvalidGeometry(format!(
                        "part '{}' has min above max",
                        record.name
                    )));
                }
                Ok(GeometryPart::new(record.name, Aabb::new(min, max)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Geometry::new(name, parts)
    }
}

impl ModelSource for RonBoundsSource {
    fn name(&self) -> &str {
        "ron"
    }

    fn load(&self, path: &Path) -> Result<Geometry, AssetError> {
        require_file(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&model_name(path), &contents)
    }
}

/// Stands in a unit box for items whose files are missing
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSource;

impl ModelSource for PlaceholderSource {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn load(&self, path: &Path) -> Result<Geometry, AssetError> {
        let name = model_name(path);
        log::warn!("Using placeholder geometry for '{name}'");
        Ok(Geometry::unit_box(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LAMP_OBJ: &str = "\
# lamp
v -0.5 0.0 -0.5
v 0.5 0.0 0.5
v 0.0 0.2 0.0
o base
f 1 2 3
v -0.2 0.8 -0.2
v 0.2 1.2 0.2
o shade
f 3/1/1 -2//1 -1/2
";

    #[test]
    fn test_obj_groups_become_parts() {
        let geometry = parse_obj("lamp", LAMP_OBJ.as_bytes()).unwrap();
        let parts = geometry.parts();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "base");
        assert_relative_eq!(parts[0].bounds.min, Vec3::new(-0.5, 0.0, -0.5));
        assert_relative_eq!(parts[0].bounds.max, Vec3::new(0.5, 0.2, 0.5));
        assert_eq!(parts[1].name, "shade");
        assert_relative_eq!(parts[1].bounds.min, Vec3::new(-0.2, 0.2, -0.2));
        assert_relative_eq!(parts[1].bounds.max, Vec3::new(0.2, 1.2, 0.2));
    }

    #[test]
    fn test_obj_without_faces_uses_all_vertices() {
        let geometry = parse_obj("cloud", "v 0 0 0\nv 1 2 3\n".as_bytes()).unwrap();
        assert_eq!(geometry.parts().len(), 1);
        assert_relative_eq!(geometry.bounds().max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_obj_bad_vertex_is_parse_error() {
        let result = parse_obj("bad", "v 1.0 nope 2.0\n".as_bytes());
        assert!(matches!(result, Err(AssetError::Parse(_))));
    }

    #[test]
    fn test_obj_face_index_out_of_range() {
        let result = parse_obj("bad", "v 0 0 0\nf 1 2 3\n".as_bytes());
        assert!(matches!(result, Err(AssetError::Parse(message)) if message.contains("out of range")));
    }

    #[test]
    fn test_empty_obj_is_invalid_geometry() {
        let result = parse_obj("empty", "# nothing\n".as_bytes());
        assert!(matches!(result, Err(AssetError::InvalidGeometry(_))));
    }

    #[test]
    fn test_ron_parts() {
        let geometry = RonBoundsSource::parse(
            "sofa",
            r#"[(name: "seat", min: (-1.0, 0.0, -0.5), max: (1.0, 0.4, 0.5))]"#,
        )
        .unwrap();
        assert_eq!(geometry.parts()[0].name, "seat");
        assert_relative_eq!(geometry.bounds().size(), Vec3::new(2.0, 0.4, 1.0));
    }

    #[test]
    fn test_ron_inverted_bounds_rejected() {
        let result = RonBoundsSource::parse("bad", r#"[(name: "x", min: (1.0, 0.0, 0.0), max: (0.0, 1.0, 1.0))]"#);
        assert!(matches!(result, Err(AssetError::InvalidGeometry(_))));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = std::env::temp_dir().join("showroom_missing_item").join("scene.obj");
        assert!(matches!(ObjGeometrySource.load(&path), Err(AssetError::NotFound(_))));
        assert!(matches!(RonBoundsSource.load(&path), Err(AssetError::NotFound(_))));
    }

    #[test]
    fn test_placeholder_named_after_item_folder() {
        let geometry = PlaceholderSource.load(Path::new("assets/models/lamp/lamp1/")).unwrap();
        assert_eq!(geometry.name, "lamp1");
    }

    #[test]
    fn test_obj_file_roundtrip_through_disk() {
        let dir = std::env::temp_dir().join(format!("showroom_obj_{}", std::process::id())).join("lamp1");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.obj");
        std::fs::write(&path, LAMP_OBJ).unwrap();

        let geometry = ObjGeometrySource.load(&path).unwrap();
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());

        assert_eq!(geometry.name, "lamp1");
        assert_eq!(geometry.parts().len(), 2);
    }

    #[test]
    fn test_shipped_models_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/models");

        let lamp = ObjGeometrySource.load(&root.join("lamp/lamp1/scene.obj")).unwrap();
        assert_eq!(lamp.parts().len(), 3);
        assert_relative_eq!(lamp.bounds().size().y, 1.45, epsilon = 1e-5);

        let sofa = RonBoundsSource.load(&root.join("sofa/sofa1/scene.ron")).unwrap();
        assert_eq!(sofa.parts().len(), 4);
        assert_eq!(sofa.name, "sofa1");
    }
}
