//! Vector and matrix math for the 3D pipeline
//!
//! Row-vector convention throughout: a point is transformed with `v * m`,
//! so `v * (a * b)` applies `a` first, then `b`. Angles are in degrees.

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// Linear interpolation between two scalars
pub fn lerp(s: f32, e: f32, t: f32) -> f32 {
    s + (e - s) * t
}

/// 2D Vector (for texture coordinates: x = u, y = v)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn u(self) -> f32 {
        self.x
    }

    pub fn v(self) -> f32 {
        self.y
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2 { x: self.x * s, y: self.y * s }
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2 { x: self.x + other.x, y: self.y + other.y }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 { x: self.x - other.x, y: self.y - other.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        self.scale(s)
    }
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. A zero vector is returned unchanged.
    pub fn normalize(self) -> Vec3 {
        let mut l = self.len();
        if l == 0.0 {
            l = 1.0;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Component-wise product
    pub fn mul_elem(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        Vec3 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            z: lerp(self.z, other.z, t),
        }
    }

    /// Homogeneous point (w = 1)
    pub fn to_point(self) -> Vec4 {
        Vec4::point(self.x, self.y, self.z)
    }

    /// Homogeneous direction (w = 0)
    pub fn to_direction(self) -> Vec4 {
        Vec4::direction(self.x, self.y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3 { x: -self.x, y: -self.y, z: -self.z }
    }
}

/// Homogeneous 4D vector. Points carry w = 1, directions w = 0.
///
/// Geometric operations (`dot`, `cross`, `len`, `normalize`) work on the
/// xyz part and leave w untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn point(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub fn direction(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 0.0 }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn dot(self, other: Vec4) -> f32 {
        self.xyz().dot(other.xyz())
    }

    pub fn cross(self, other: Vec4) -> Vec4 {
        let c = self.xyz().cross(other.xyz());
        Vec4::direction(c.x, c.y, c.z)
    }

    pub fn len(self) -> f32 {
        self.xyz().len()
    }

    pub fn normalize(self) -> Vec4 {
        let n = self.xyz().normalize();
        Vec4::new(n.x, n.y, n.z, self.w)
    }

    /// Scale all four components
    pub fn scale(self, s: f32) -> Vec4 {
        Vec4::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }

    pub fn lerp(self, other: Vec4, t: f32) -> Vec4 {
        Vec4 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            z: lerp(self.z, other.z, t),
            w: lerp(self.w, other.w, t),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, other: Vec4) -> Vec4 {
        Vec4::new(self.x + other.x, self.y + other.y, self.z + other.z, self.w + other.w)
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, other: Vec4) -> Vec4 {
        Vec4::new(self.x - other.x, self.y - other.y, self.z - other.z, self.w - other.w)
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    fn mul(self, s: f32) -> Vec4 {
        self.scale(s)
    }
}

/// Row vector times matrix
impl Mul<Mat4> for Vec4 {
    type Output = Vec4;
    fn mul(self, m: Mat4) -> Vec4 {
        let e = &m.e;
        Vec4 {
            x: self.x * e[0] + self.y * e[4] + self.z * e[8] + self.w * e[12],
            y: self.x * e[1] + self.y * e[5] + self.z * e[9] + self.w * e[13],
            z: self.x * e[2] + self.y * e[6] + self.z * e[10] + self.w * e[14],
            w: self.x * e[3] + self.y * e[7] + self.z * e[11] + self.w * e[15],
        }
    }
}

/// 4x4 matrix, row-major (`e[row * 4 + col]`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub e: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        e: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const ZERO: Mat4 = Mat4 { e: [0.0; 16] };

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.e[row * 4 + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.e[row * 4 + col] = value;
    }

    pub fn is_identity(&self) -> bool {
        *self == Mat4::IDENTITY
    }

    /// Start from identity and overwrite the given cells.
    ///
    /// Scale, translation and the axis rotations are only correct when the
    /// untouched cells hold identity values, so every constructor goes
    /// through here.
    fn identity_with(cells: &[(usize, usize, f32)]) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        for &(row, col, value) in cells {
            m.set(row, col, value);
        }
        m
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Self::identity_with(&[(3, 0, x), (3, 1, y), (3, 2, z)])
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
        Self::identity_with(&[(0, 0, x), (1, 1, y), (2, 2, z)])
    }

    /// Rotation around X by `angle` degrees
    pub fn rotation_x(angle: f32) -> Mat4 {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::identity_with(&[(1, 1, cos), (1, 2, sin), (2, 1, -sin), (2, 2, cos)])
    }

    /// Rotation around Y by `angle` degrees
    pub fn rotation_y(angle: f32) -> Mat4 {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::identity_with(&[(0, 0, cos), (0, 2, -sin), (2, 0, sin), (2, 2, cos)])
    }

    /// Rotation around Z by `angle` degrees
    pub fn rotation_z(angle: f32) -> Mat4 {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::identity_with(&[(0, 0, cos), (0, 1, sin), (1, 0, -sin), (1, 1, cos)])
    }

    /// Combined Euler rotation `Ry · Rx · Rz` (angles in degrees)
    pub fn rotation(euler: Vec3) -> Mat4 {
        Mat4::rotation_y(euler.y) * Mat4::rotation_x(euler.x) * Mat4::rotation_z(euler.z)
    }

    /// Left-handed perspective projection for row vectors.
    ///
    /// `fov` is the vertical field of view in degrees. Clip-space w equals
    /// camera-space z.
    pub fn projection(near: f32, far: f32, fov: f32, width: f32, height: f32) -> Mat4 {
        let aspect = height / width;
        let fov_rad = 1.0 / (fov * 0.5).to_radians().tan();

        let mut m = Mat4::ZERO;
        m.set(0, 0, aspect * -fov_rad);
        m.set(1, 1, fov_rad);
        m.set(2, 2, far / (far - near));
        m.set(2, 3, 1.0);
        m.set(3, 2, (-far * near) / (far - near));
        m
    }

    pub fn transpose(&self) -> Mat4 {
        let mut out = Mat4::ZERO;
        for row in 0..4 {
            for col in 0..4 {
                out.set(col, row, self.get(row, col));
            }
        }
        out
    }

    /// Transform a point (w = 1) and drop w
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (p.to_point() * *self).xyz()
    }

    /// Transform a direction (w = 0) and drop w
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        (d.to_direction() * *self).xyz()
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, b: Mat4) -> Mat4 {
        let mut out = Mat4::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.e[i * 4 + k] * b.e[k * 4 + j];
                }
                out.e[i * 4 + j] = sum;
            }
        }
        out
    }
}

/// Half-space `dot(p, normal) >= distance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub distance: f32,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(distance: f32, normal: Vec3) -> Self {
        Self { distance, normal }
    }

    pub fn dot(&self, p: Vec3) -> f32 {
        p.dot(self.normal)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.dot(p) >= self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat_approx_eq(a: &Mat4, b: &Mat4) -> bool {
        a.e.iter().zip(b.e.iter()).all(|(x, y)| (x - y).abs() < 0.0001)
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_normalize_unit_length() {
        let samples = [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-0.001, 0.002, 0.0005),
            Vec3::new(1000.0, -2000.0, 3000.0),
        ];
        for v in samples {
            assert!((v.normalize().len() - 1.0).abs() < 0.0001);
        }
    }

    #[test]
    fn test_normalize_zero_is_noop() {
        let n = Vec3::ZERO.normalize();
        assert_eq!(n, Vec3::ZERO);
        assert!(n.x.is_finite());

        let p = Vec4::point(0.0, 0.0, 0.0).normalize();
        assert_eq!(p.w, 1.0);
        assert!(p.x.is_finite());
    }

    #[test]
    fn test_identity_is_neutral() {
        let m = Mat4::rotation(Vec3::new(10.0, 20.0, 30.0))
            * Mat4::translation(1.0, 2.0, 3.0)
            * Mat4::scale(2.0, 0.5, 4.0);
        assert!(mat_approx_eq(&(m * Mat4::IDENTITY), &m));
        assert!(mat_approx_eq(&(Mat4::IDENTITY * m), &m));
    }

    #[test]
    fn test_constructors_start_from_identity() {
        assert!(Mat4::translation(0.0, 0.0, 0.0).is_identity());
        assert!(Mat4::scale(1.0, 1.0, 1.0).is_identity());
        assert!(Mat4::rotation(Vec3::ZERO).is_identity());

        // Untouched cells keep their identity values
        let t = Mat4::translation(1.0, 2.0, 3.0);
        assert_eq!(t.get(3, 3), 1.0);
        assert_eq!(t.get(0, 3), 0.0);
        let s = Mat4::scale(2.0, 3.0, 4.0);
        assert_eq!(s.get(3, 3), 1.0);
        assert_eq!(s.get(3, 0), 0.0);
    }

    #[test]
    fn test_multiply_applies_left_first() {
        let t = Mat4::translation(5.0, 0.0, 0.0);
        let s = Mat4::scale(2.0, 2.0, 2.0);
        let p = Vec4::point(1.0, 0.0, 0.0);

        // scale then translate: 1*2 + 5
        let a = p * (s * t);
        assert!((a.x - 7.0).abs() < 0.0001);

        // translate then scale: (1+5)*2
        let b = p * (t * s);
        assert!((b.x - 12.0).abs() < 0.0001);
    }

    #[test]
    fn test_translation_ignores_directions() {
        let t = Mat4::translation(5.0, 6.0, 7.0);
        let d = Vec4::direction(1.0, 0.0, 0.0) * t;
        assert_eq!(d.xyz(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_euler_rotation_order() {
        let euler = Vec3::new(15.0, 40.0, -70.0);
        let expected = Mat4::rotation_y(40.0) * Mat4::rotation_x(15.0) * Mat4::rotation_z(-70.0);
        assert!(mat_approx_eq(&Mat4::rotation(euler), &expected));
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let v = Vec4::point(1.0, 0.0, 0.0) * Mat4::rotation_y(90.0);
        assert!(v.x.abs() < 0.0001);
        assert!((v.z + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_rotation_inverse_is_transpose() {
        let r = Mat4::rotation(Vec3::new(33.0, -71.0, 128.0));
        let p = Vec4::point(1.5, -2.0, 7.25);
        let back = p * r * r.transpose();
        assert!((back.x - p.x).abs() < 0.0001);
        assert!((back.y - p.y).abs() < 0.0001);
        assert!((back.z - p.z).abs() < 0.0001);
        assert!(mat_approx_eq(&(r * r.transpose()), &Mat4::IDENTITY));
    }

    #[test]
    fn test_projection_cells() {
        let m = Mat4::projection(1.0, 101.0, 90.0, 200.0, 100.0);
        assert!((m.get(0, 0) + 0.5).abs() < 0.0001);
        assert!((m.get(1, 1) - 1.0).abs() < 0.0001);
        assert!((m.get(2, 2) - 101.0 / 100.0).abs() < 0.0001);
        assert_eq!(m.get(2, 3), 1.0);
        assert!((m.get(3, 2) + 101.0 / 100.0).abs() < 0.0001);
        assert_eq!(m.get(3, 3), 0.0);
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn test_projection_w_is_view_depth() {
        let m = Mat4::projection(0.5, 100.0, 60.0, 320.0, 240.0);
        let clip = Vec4::point(3.0, -2.0, 12.5) * m;
        assert!((clip.w - 12.5).abs() < 0.0001);
    }

    #[test]
    fn test_plane_contains() {
        let near = Plane::new(1.0, Vec3::FORWARD);
        assert!(near.contains(Vec3::new(0.0, 0.0, 1.0)));
        assert!(near.contains(Vec3::new(5.0, 5.0, 3.0)));
        assert!(!near.contains(Vec3::new(0.0, 0.0, 0.5)));
    }
}
