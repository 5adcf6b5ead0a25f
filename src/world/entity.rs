//! Render entities: shared attribute arrays, per-face index triples and a
//! placement transform.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::rasterizer::{Color, Mat4, Vec2, Vec3, Vec4, Vertex, VertexAttributes};

/// Error type for mesh construction and loading
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to load OBJ: {0}")]
    Load(#[from] tobj::LoadError),
    #[error("face {face}: {kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        face: usize,
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("face {face} has {count} vertices, need at least 3")]
    TooFewVertices { face: usize, count: usize },
}

/// Entity placement. Rotation is in degrees, applied Y, X, Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Local -> world: scale in object axes, rotate, then translate
    pub fn model_matrix(&self) -> Mat4 {
        let s = self.scale;
        let p = self.position;
        Mat4::scale(s.x, s.y, s.z) * Mat4::rotation(self.rotation) * Mat4::translation(p.x, p.y, p.z)
    }

    /// Matrix for normals: inverse scale, then rotation. Results still need
    /// renormalizing. A zero scale axis is treated as 1.
    pub fn normal_matrix(&self) -> Mat4 {
        let inv = |v: f32| if v == 0.0 { 1.0 } else { 1.0 / v };
        let s = self.scale;
        Mat4::scale(inv(s.x), inv(s.y), inv(s.z)) * Mat4::rotation(self.rotation)
    }
}

/// One corner of a face: 0-based indices into the entity's arrays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceIndex {
    pub position: usize,
    pub texcoord: usize,
    pub normal: usize,
}

impl FaceIndex {
    pub fn new(position: usize, texcoord: usize, normal: usize) -> Self {
        Self { position, texcoord, normal }
    }
}

/// A convex polygon, fan-triangulated from its first corner at draw time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    pub indices: Vec<FaceIndex>,
}

impl Face {
    pub fn new(indices: Vec<FaceIndex>) -> Self {
        Self { indices }
    }

    /// Face whose corners use the same index for every attribute
    pub fn uniform(indices: &[usize]) -> Self {
        Self {
            indices: indices.iter().map(|&i| FaceIndex::new(i, i, i)).collect(),
        }
    }
}

/// A mesh plus its material and transform.
///
/// Attribute arrays are shared by all faces. `colors` is indexed like
/// `positions`. Empty arrays mean the attribute is absent.
#[derive(Debug, Clone, Default)]
pub struct RenderEntity {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Color>,
    pub faces: Vec<Face>,
    pub material_index: usize,
    pub transform: Transform,
}

impl RenderEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material_index: usize) -> Self {
        self.material_index = material_index;
        self
    }

    /// Optional attributes this mesh provides
    pub fn attributes(&self) -> VertexAttributes {
        let mut attrs = VertexAttributes::empty();
        attrs.set(VertexAttributes::TEXCOORD, !self.texcoords.is_empty());
        attrs.set(VertexAttributes::NORMAL, !self.normals.is_empty());
        attrs.set(VertexAttributes::COLOR, !self.colors.is_empty());
        attrs
    }

    /// Build the local-space polygon for `face` into `out`.
    ///
    /// Missing attributes and out-of-range indices fall back to the vertex
    /// defaults (origin, zero texcoord/normal, white).
    pub fn gather_face(&self, face: &Face, out: &mut Vec<Vertex>) {
        out.clear();
        out.extend(face.indices.iter().map(|idx| {
            let position = self
                .positions
                .get(idx.position)
                .map_or(Vec4::point(0.0, 0.0, 0.0), |p| p.to_point());
            let texcoord = self.texcoords.get(idx.texcoord).copied().unwrap_or(Vec2::ZERO);
            let normal = self.normals.get(idx.normal).map_or(Vec4::ZERO, |n| n.to_direction());
            let color = self.colors.get(idx.position).copied().unwrap_or(Color::WHITE);
            Vertex::new(position, texcoord, normal, color)
        }));
    }

    /// Check every face for arity and index bounds
    pub fn validate(&self) -> Result<(), MeshError> {
        let check = |face: usize, kind: &'static str, index: usize, len: usize| {
            if index < len {
                Ok(())
            } else {
                Err(MeshError::IndexOutOfRange { face, kind, index, len })
            }
        };

        for (i, face) in self.faces.iter().enumerate() {
            if face.indices.len() < 3 {
                return Err(MeshError::TooFewVertices { face: i, count: face.indices.len() });
            }
            for idx in &face.indices {
                check(i, "position", idx.position, self.positions.len())?;
                if !self.texcoords.is_empty() {
                    check(i, "texcoord", idx.texcoord, self.texcoords.len())?;
                }
                if !self.normals.is_empty() {
                    check(i, "normal", idx.normal, self.normals.len())?;
                }
                if !self.colors.is_empty() {
                    check(i, "color", idx.position, self.colors.len())?;
                }
            }
        }
        Ok(())
    }

    /// 2x2x2 cube centered on the origin: 24 vertices, 6 outward-facing quads
    pub fn cube() -> Self {
        let positions = vec![
            // Front
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            // Back
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            // Top
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
            // Bottom
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            // Right
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            // Left
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ];

        let face_normals = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        ];

        let texcoords = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let faces = (0..6)
            .map(|f| {
                Face::new(
                    (0..4).map(|corner| FaceIndex::new(f * 4 + corner, corner, f)).collect(),
                )
            })
            .collect();

        Self {
            name: "cube".to_string(),
            positions,
            texcoords,
            normals: face_normals.to_vec(),
            faces,
            ..Default::default()
        }
    }

    /// 2x2 quad in the XY plane facing -Z
    pub fn quad() -> Self {
        Self {
            name: "quad".to_string(),
            positions: vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
            ],
            texcoords: vec![
                Vec2::new(0.0, 1.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
            ],
            normals: vec![Vec3::new(0.0, 0.0, -1.0)],
            faces: vec![Face::new(
                (0..4).map(|i| FaceIndex::new(i, i, 0)).collect(),
            )],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::face_normal;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 0.0001
    }

    #[test]
    fn test_model_matrix_scale_rotate_translate() {
        let t = Transform::new(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 90.0, 0.0),
            Vec3::new(2.0, 1.0, 1.0),
        );
        // Scaled along local X first, then rotated onto Z, then moved
        let p = t.model_matrix().transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx(p, Vec3::new(10.0, 0.0, -2.0)), "got {:?}", p);
    }

    #[test]
    fn test_model_matrix_order_matters_for_non_uniform_scale() {
        let t = Transform::new(Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let rotate_first = Mat4::rotation(t.rotation) * Mat4::scale(2.0, 1.0, 1.0);
        let v = Vec3::new(1.0, 0.0, 0.0);
        assert!(!approx(t.model_matrix().transform_point(v), rotate_first.transform_point(v)));
    }

    #[test]
    fn test_normal_matrix_keeps_normals_perpendicular() {
        let t = Transform::new(Vec3::ZERO, Vec3::new(0.0, 30.0, 0.0), Vec3::new(4.0, 1.0, 1.0));
        // Slanted surface: its normal must stay perpendicular after scaling
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 1.0, 0.0);
        let n = Vec3::new(1.0, -1.0, 0.0).normalize();

        let m = t.model_matrix();
        let edge = m.transform_point(b) - m.transform_point(a);
        let n_world = t.normal_matrix().transform_direction(n).normalize();
        assert!(edge.dot(n_world).abs() < 0.0001);
        assert!((n_world.len() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_normal_matrix_zero_scale() {
        let t = Transform::new(Vec3::ZERO, Vec3::ZERO, Vec3::new(0.0, 1.0, 1.0));
        let n = t.normal_matrix().transform_direction(Vec3::new(1.0, 0.0, 0.0));
        assert!(n.x.is_finite());
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = RenderEntity::cube();
        cube.validate().unwrap();
        assert_eq!(cube.positions.len(), 24);
        assert_eq!(cube.faces.len(), 6);
        assert_eq!(cube.attributes(), VertexAttributes::TEXCOORD | VertexAttributes::NORMAL);

        let mut poly = Vec::new();
        for face in &cube.faces {
            cube.gather_face(face, &mut poly);
            let p: Vec<Vec3> = poly.iter().map(|v| v.position.xyz()).collect();
            let n = face_normal(p[0], p[1], p[2]);
            assert!(approx(n, poly[0].normal.xyz()), "face normal {:?}", n);
            assert!(n.dot(p[0]) > 0.0);
        }
    }

    #[test]
    fn test_quad_faces_negative_z() {
        let quad = RenderEntity::quad();
        quad.validate().unwrap();
        let mut poly = Vec::new();
        quad.gather_face(&quad.faces[0], &mut poly);
        let n = face_normal(poly[0].position.xyz(), poly[1].position.xyz(), poly[2].position.xyz());
        assert!(approx(n, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_gather_face_out_of_range_uses_defaults() {
        let mut e = RenderEntity::new("broken");
        e.positions = vec![Vec3::new(1.0, 2.0, 3.0)];
        e.colors = vec![Color::RED];
        e.faces = vec![Face::new(vec![
            FaceIndex::new(0, 5, 5),
            FaceIndex::new(9, 0, 0),
            FaceIndex::new(0, 0, 0),
        ])];

        let mut poly = Vec::new();
        e.gather_face(&e.faces[0], &mut poly);
        assert_eq!(poly.len(), 3);
        assert_eq!(poly[0].position, Vec4::point(1.0, 2.0, 3.0));
        assert_eq!(poly[0].color, Color::RED);
        assert_eq!(poly[0].texcoord, Vec2::ZERO);
        assert_eq!(poly[1].position, Vec4::point(0.0, 0.0, 0.0));
        assert_eq!(poly[1].color, Color::WHITE);
    }

    #[test]
    fn test_validate_reports_bad_faces() {
        let mut e = RenderEntity::new("tri");
        e.positions = vec![Vec3::ZERO, Vec3::ONE, Vec3::UP];
        e.faces = vec![Face::uniform(&[0, 1])];
        assert!(matches!(e.validate(), Err(MeshError::TooFewVertices { face: 0, count: 2 })));

        e.faces = vec![Face::uniform(&[0, 1, 3])];
        assert!(matches!(
            e.validate(),
            Err(MeshError::IndexOutOfRange { kind: "position", index: 3, .. })
        ));

        e.normals = vec![Vec3::UP];
        e.faces = vec![Face::uniform(&[0, 1, 2])];
        assert!(matches!(e.validate(), Err(MeshError::IndexOutOfRange { kind: "normal", .. })));
    }
}
