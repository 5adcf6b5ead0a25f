//! Wavefront OBJ loading via `tobj`
//!
//! Faces keep their separate position/texcoord/normal indices and their
//! arity, so quads and other N-gons reach the clipper untriangulated. All
//! models in a file are merged into one entity. Texture `v` is flipped so
//! that 0 is the top row.

use std::io::Cursor;
use std::path::Path;

use super::entity::{Face, FaceIndex, MeshError, RenderEntity};
use crate::rasterizer::{Color, Vec2, Vec3};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load an OBJ file. Materials referenced by the file are ignored.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<RenderEntity, MeshError> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let entity = merge_models(name, &models)?;
    log::info!(
        "Loaded mesh: {} ({} positions, {} faces)",
        entity.name,
        entity.positions.len(),
        entity.faces.len()
    );
    Ok(entity)
}

/// Load OBJ source text (for embedded meshes or testing)
pub fn load_obj_from_str(name: &str, src: &str) -> Result<RenderEntity, MeshError> {
    let mut reader = Cursor::new(src.as_bytes());
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;
    merge_models(name.to_string(), &models)
}

fn vec3s(flat: &[f32]) -> impl Iterator<Item = Vec3> + '_ {
    flat.chunks_exact(3).map(|c| Vec3::new(c[0], c[1], c[2]))
}

fn merge_models(name: String, models: &[tobj::Model]) -> Result<RenderEntity, MeshError> {
    let mut entity = RenderEntity::new(name);

    for model in models {
        let mesh = &model.mesh;
        let base_pos = entity.positions.len();
        let base_tex = entity.texcoords.len();
        let base_nrm = entity.normals.len();

        entity.positions.extend(vec3s(&mesh.positions));
        entity.normals.extend(vec3s(&mesh.normals));
        entity.texcoords.extend(
            mesh.texcoords
                .chunks_exact(2)
                .map(|c| Vec2::new(c[0], 1.0 - c[1])),
        );
        entity
            .colors
            .extend(vec3s(&mesh.vertex_color).map(|c| Color::rgb(c.x, c.y, c.z)));

        // Empty arities means every face is a triangle
        let arities: Vec<usize> = if mesh.face_arities.is_empty() {
            vec![3; mesh.indices.len() / 3]
        } else {
            mesh.face_arities.iter().map(|&a| a as usize).collect()
        };

        let mut start = 0;
        for arity in arities {
            let end = start + arity;
            let corners = (start..end)
                .map(|k| {
                    let position = mesh.indices.get(k).map_or(usize::MAX, |&i| i as usize + base_pos);
                    let texcoord = mesh.texcoord_indices.get(k).map_or(0, |&i| i as usize + base_tex);
                    let normal = mesh.normal_indices.get(k).map_or(0, |&i| i as usize + base_nrm);
                    FaceIndex::new(position, texcoord, normal)
                })
                .collect();
            entity.faces.push(Face::new(corners));
            start = end;
        }
    }

    // Per-vertex colors only make sense when every position has one
    if entity.colors.len() != entity.positions.len() {
        entity.colors.clear();
    }

    entity.validate()?;
    Ok(entity)
}
