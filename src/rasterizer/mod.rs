//! Software rasterizer
//!
//! Features:
//! - Homogeneous transforms (row vectors, left-handed projection)
//! - Sutherland-Hodgman clipping against the six frustum planes
//! - Perspective-correct scanline fill with a 1/w depth buffer
//! - Flat and Gouraud directional lighting with constant ambient
//! - Nearest-neighbor texturing with binary alpha test

mod math;
mod types;
mod framebuffer;
mod camera;
mod clip;
mod render;

pub use math::*;
pub use types::*;
pub use framebuffer::*;
pub use camera::*;
pub use clip::*;
pub use render::*;

/// Default framebuffer dimensions
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 360;
