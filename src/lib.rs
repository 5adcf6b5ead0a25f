//! Bonnie Raster: CPU-only 3D rasterizer
//!
//! Textured, lit polygon meshes go in, a packed color framebuffer comes
//! out. No GPU API is involved until the demo viewer blits the result.
//! - Homogeneous 6-plane frustum clipping of N-gon faces
//! - Perspective-correct scanline fill with a 1/w depth buffer
//! - Flat or Gouraud directional light with constant ambient
//! - OBJ meshes and RON scene files

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod world;
pub mod renderer;
pub mod app;
