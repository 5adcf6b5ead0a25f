//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files. A scene
//! names its textures and meshes; [`SceneDesc::build`] loads them. Relative
//! asset paths resolve against the scene file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::entity::{RenderEntity, Transform};
use super::obj::load_obj;
use crate::rasterizer::{Camera, Color, Material, RasterSettings, Texture, TextureError, Vec3};

/// Error type for scene loading
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Where a texture's pixels come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextureSource {
    /// Image file, optionally flipped after decoding
    File {
        path: PathBuf,
        #[serde(default)]
        flip_horizontal: bool,
        #[serde(default)]
        flip_vertical: bool,
    },
    Solid(Color),
    Checkerboard { size: usize, a: Color, b: Color },
}

/// Where an entity's mesh comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshSource {
    Obj(PathBuf),
    Cube,
    Quad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDesc {
    #[serde(default)]
    pub name: String,
    pub mesh: MeshSource,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub material_index: usize,
    /// Rotation speed around Y in degrees per second
    #[serde(default)]
    pub spin: f32,
}

/// Serialized scene description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDesc {
    pub settings: RasterSettings,
    pub camera: Camera,
    pub textures: Vec<TextureSource>,
    pub materials: Vec<Material>,
    pub entities: Vec<EntityDesc>,
}

/// A scene with its assets loaded
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub settings: RasterSettings,
    pub camera: Camera,
    pub textures: Vec<Texture>,
    pub materials: Vec<Material>,
    pub entities: Vec<RenderEntity>,
    /// Spin rate per entity, parallel to `entities`
    pub spins: Vec<f32>,
}

impl SceneDesc {
    /// Built-in scene used when no file is given: a checkered floor with a
    /// spinning cube on it
    pub fn demo() -> Self {
        let checker = TextureSource::Checkerboard {
            size: 64,
            a: Color::rgb(0.9, 0.9, 0.85),
            b: Color::rgb(0.25, 0.3, 0.35),
        };
        Self {
            textures: vec![checker, TextureSource::Solid(Color::rgb(0.85, 0.55, 0.2))],
            materials: vec![Material::new(0), Material::new(1)],
            entities: vec![
                EntityDesc {
                    name: "floor".to_string(),
                    mesh: MeshSource::Quad,
                    transform: Transform::new(
                        Vec3::ZERO,
                        Vec3::new(90.0, 0.0, 0.0),
                        Vec3::new(40.0, 40.0, 1.0),
                    ),
                    material_index: 0,
                    spin: 0.0,
                },
                EntityDesc {
                    name: "cube".to_string(),
                    mesh: MeshSource::Cube,
                    transform: Transform::new(
                        Vec3::new(0.0, 10.0, 0.0),
                        Vec3::ZERO,
                        Vec3::new(10.0, 10.0, 10.0),
                    ),
                    material_index: 1,
                    spin: -30.0,
                },
            ],
            ..Default::default()
        }
    }

    /// Load every texture and mesh. Assets that fail to load are logged and
    /// left out: a broken texture becomes an empty one (drawn untextured) so
    /// material indices stay valid, and a broken mesh drops its entity.
    pub fn build(&self, base_dir: &Path) -> Scene {
        let textures = self
            .textures
            .iter()
            .map(|source| match load_texture(source, base_dir) {
                Ok(tex) => tex,
                Err(e) => {
                    log::warn!("Skipping texture {:?}: {}", source, e);
                    Texture::solid(0, 0, Color::WHITE)
                }
            })
            .collect();

        let mut entities = Vec::with_capacity(self.entities.len());
        let mut spins = Vec::with_capacity(self.entities.len());
        for desc in &self.entities {
            let mesh = match &desc.mesh {
                MeshSource::Cube => Ok(RenderEntity::cube()),
                MeshSource::Quad => Ok(RenderEntity::quad()),
                MeshSource::Obj(path) => load_obj(base_dir.join(path)),
            };
            match mesh {
                Ok(mut entity) => {
                    if !desc.name.is_empty() {
                        entity.name = desc.name.clone();
                    }
                    entities.push(entity.with_transform(desc.transform).with_material(desc.material_index));
                    spins.push(desc.spin);
                }
                Err(e) => log::warn!("Skipping entity {:?}: {}", desc.name, e),
            }
        }

        Scene {
            settings: self.settings.clone(),
            camera: self.camera.clone(),
            textures,
            materials: self.materials.clone(),
            entities,
            spins,
        }
    }
}

fn load_texture(source: &TextureSource, base_dir: &Path) -> Result<Texture, TextureError> {
    match source {
        TextureSource::File { path, flip_horizontal, flip_vertical } => {
            let mut tex = Texture::from_file(base_dir.join(path))?;
            if *flip_horizontal {
                tex.flip_horizontal();
            }
            if *flip_vertical {
                tex.flip_vertical();
            }
            Ok(tex)
        }
        TextureSource::Solid(color) => Ok(Texture::solid(1, 1, *color)),
        TextureSource::Checkerboard { size, a, b } => Ok(Texture::checkerboard(*size, *size, *a, *b)),
    }
}

/// Load a scene description from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneDesc, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Save a scene description to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &SceneDesc, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a scene description from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneDesc, SceneError> {
    Ok(ron::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::ShadingMode;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.ron");

        let desc = SceneDesc::demo();
        save_scene(&desc, &path).unwrap();
        let back = load_scene(&path).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn test_partial_scene_uses_defaults() {
        let desc = load_scene_from_str(
            "(
                settings: (shading: Gouraud, wireframe: true),
                entities: [(mesh: Cube, spin: 45.0)],
            )",
        )
        .unwrap();
        assert_eq!(desc.settings.shading, ShadingMode::Gouraud);
        assert!(desc.settings.wireframe);
        assert_eq!(desc.settings.ambient, RasterSettings::default().ambient);
        assert_eq!(desc.camera.fov, 90.0);
        assert_eq!(desc.entities[0].transform, Transform::default());
        assert_eq!(desc.entities[0].spin, 45.0);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(load_scene_from_str("(entities: [(mesh: Sphere)])"), Err(SceneError::Parse(_))));
        assert!(matches!(load_scene("/nonexistent/scene.ron"), Err(SceneError::Io(_))));
    }

    #[test]
    fn test_bundled_demo_scene() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/scene.ron");
        let desc = load_scene(&path).unwrap();
        let scene = desc.build(path.parent().unwrap());
        assert_eq!(scene.entities.len(), 3);
        assert_eq!(scene.entities[2].name, "pyramid");
        assert_eq!(scene.entities[2].faces.len(), 5);
        assert_eq!(scene.entities[2].faces[0].indices.len(), 4);
        assert_eq!(scene.settings.wireframe_color, RasterSettings::default().wireframe_color);
    }

    #[test]
    fn test_build_builtin_meshes() {
        let scene = SceneDesc::demo().build(Path::new("."));
        assert_eq!(scene.entities.len(), 2);
        assert_eq!(scene.spins, vec![0.0, -30.0]);
        assert_eq!(scene.entities[1].name, "cube");
        assert_eq!(scene.entities[1].material_index, 1);
        assert_eq!(scene.textures[0].width, 64);
    }

    #[test]
    fn test_build_skips_missing_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let desc = SceneDesc {
            textures: vec![
                TextureSource::File {
                    path: PathBuf::from("missing.png"),
                    flip_horizontal: false,
                    flip_vertical: true,
                },
                TextureSource::Solid(Color::RED),
            ],
            entities: vec![
                EntityDesc {
                    name: "gone".to_string(),
                    mesh: MeshSource::Obj(PathBuf::from("missing.obj")),
                    transform: Transform::default(),
                    material_index: 0,
                    spin: 10.0,
                },
                EntityDesc {
                    name: String::new(),
                    mesh: MeshSource::Obj(PathBuf::from("tri.obj")),
                    transform: Transform::default(),
                    material_index: 0,
                    spin: 20.0,
                },
            ],
            ..Default::default()
        };

        let scene = desc.build(dir.path());
        assert_eq!(scene.textures.len(), 2);
        assert!(scene.textures[0].pixels.is_empty());
        assert_eq!(scene.textures[1].sample(0.5, 0.5), Color::RED);
        assert_eq!(scene.entities.len(), 1);
        assert_eq!(scene.entities[0].name, "tri");
        assert_eq!(scene.spins, vec![20.0]);
    }
}
