//! World module - entities, meshes and scene files
//!
//! - Render entities with shared attribute arrays and N-gon faces
//! - OBJ mesh loading
//! - RON scene descriptions with deferred asset loading

mod entity;
mod obj;
mod scene;

pub use entity::*;
pub use obj::*;
pub use scene::*;
