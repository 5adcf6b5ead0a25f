//! Camera state: view matrix and frustum clip planes

use serde::{Serialize, Deserialize};

use super::math::{Mat4, Plane, Vec3, Vec4};

pub const CLIP_PLANE_COUNT: usize = 6;

/// Index of each plane in [`Camera::planes`]
pub const NEAR_PLANE: usize = 0;
pub const FAR_PLANE: usize = 1;
pub const LEFT_PLANE: usize = 2;
pub const RIGHT_PLANE: usize = 3;
pub const TOP_PLANE: usize = 4;
pub const BOTTOM_PLANE: usize = 5;

/// Camera state
///
/// Only position, direction and lens parameters are persistent. The view
/// matrix and planes are rebuilt every frame by [`Camera::update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    /// Euler angles in degrees (pitch, yaw, roll)
    pub direction: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub z_near: f32,
    pub z_far: f32,

    // Computed each frame
    #[serde(skip)]
    pub view: Mat4,
    #[serde(skip)]
    pub planes: [Plane; CLIP_PLANE_COUNT],
}

impl Camera {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
            ..Default::default()
        }
    }

    /// Rotation part of the view matrix: negated angles, order Y, X, Z
    fn view_rotation(&self) -> Mat4 {
        let d = self.direction;
        Mat4::rotation_y(-d.y) * Mat4::rotation_x(-d.x) * Mat4::rotation_z(-d.z)
    }

    /// Rebuild the world -> camera matrix: translate by -position, then
    /// rotate by the inverse Euler rotation.
    pub fn update_view_matrix(&mut self) {
        let p = self.position;
        self.view = Mat4::translation(-p.x, -p.y, -p.z) * self.view_rotation();
    }

    /// Rebuild the six camera-space clip planes for a viewport of the given
    /// pixel size. The side planes match [`Camera::projection`].
    pub fn update_clip_planes(&mut self, width: usize, height: usize) {
        let aspect = height.max(1) as f32 / width.max(1) as f32;
        let fov_rad = 1.0 / (self.fov * 0.5).to_radians().tan();
        let fov_aspect = fov_rad * aspect;

        self.planes[NEAR_PLANE] = Plane::new(self.z_near, Vec3::new(0.0, 0.0, 1.0));
        self.planes[FAR_PLANE] = Plane::new(-self.z_far, Vec3::new(0.0, 0.0, -1.0));
        self.planes[LEFT_PLANE] = Plane::new(0.0, Vec3::new(-fov_aspect, 0.0, 1.0).normalize());
        self.planes[RIGHT_PLANE] = Plane::new(0.0, Vec3::new(fov_aspect, 0.0, 1.0).normalize());
        self.planes[TOP_PLANE] = Plane::new(0.0, Vec3::new(0.0, -fov_rad, 1.0).normalize());
        self.planes[BOTTOM_PLANE] = Plane::new(0.0, Vec3::new(0.0, fov_rad, 1.0).normalize());
    }

    /// Per-frame refresh of everything derived from the camera state
    pub fn update(&mut self, width: usize, height: usize) {
        self.update_view_matrix();
        self.update_clip_planes(width, height);
    }

    /// Camera -> clip matrix for a viewport of the given pixel size
    pub fn projection(&self, width: usize, height: usize) -> Mat4 {
        Mat4::projection(
            self.z_near,
            self.z_far,
            self.fov,
            width.max(1) as f32,
            height.max(1) as f32,
        )
    }

    /// Camera-space axis expressed in world space
    fn world_axis(&self, x: f32, y: f32, z: f32) -> Vec3 {
        (Vec4::direction(x, y, z) * self.view_rotation().transpose()).xyz()
    }

    /// World-space direction the camera looks along
    pub fn forward(&self) -> Vec3 {
        self.world_axis(0.0, 0.0, 1.0)
    }

    pub fn right(&self) -> Vec3 {
        self.world_axis(1.0, 0.0, 0.0)
    }

    pub fn up(&self) -> Vec3 {
        self.world_axis(0.0, 1.0, 0.0)
    }

    /// Turn by pitch/yaw deltas in degrees, pitch clamped short of vertical
    pub fn rotate(&mut self, pitch: f32, yaw: f32) {
        self.direction.x = (self.direction.x + pitch).clamp(-89.0, 89.0);
        self.direction.y = (self.direction.y + yaw) % 360.0;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 38.2, -56.2),
            direction: Vec3::new(25.0, 0.0, 0.0),
            fov: 90.0,
            z_near: 0.5,
            z_far: 2000.0,
            view: Mat4::IDENTITY,
            planes: [Plane::default(); CLIP_PLANE_COUNT],
        }
    }
}
