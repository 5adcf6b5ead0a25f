//! Per-frame orchestration
//!
//! [`Renderer`] owns everything a frame needs (framebuffer, camera,
//! settings, entities, textures, materials and scratch buffers) and runs
//! each face through: gather -> world -> light -> camera -> cull -> clip ->
//! project -> screen -> fill, with an optional wireframe overlay.

use crate::rasterizer::{
    fan_triangles, face_normal, fill_triangle, is_backface, project_to_screen, shade,
    stroke_triangle, Camera, Clipper, Framebuffer, Mat4, Material, RasterSettings, ShadingMode,
    Texture, Vertex, VertexAttributes,
};
use crate::world::{RenderEntity, Scene};

/// Counters collected while rendering one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    /// Faces rejected by the backface test
    pub culled: usize,
    /// Faces with fewer than three vertices left after frustum clipping
    pub clipped: usize,
    /// Faces skipped for bad geometry (short face, vertex on w = 0)
    pub degenerate: usize,
    pub triangles: usize,
    pub pixels: usize,
}

/// Scratch polygons reused across faces
#[derive(Debug, Default)]
struct Scratch {
    world: Vec<Vertex>,
    screen: Vec<Vertex>,
    clipper: Clipper,
}

/// Rendering context
pub struct Renderer {
    pub framebuffer: Framebuffer,
    pub camera: Camera,
    pub settings: RasterSettings,
    pub entities: Vec<RenderEntity>,
    pub textures: Vec<Texture>,
    pub materials: Vec<Material>,
    projection: Mat4,
    scratch: Scratch,
}

impl Renderer {
    pub fn new(width: usize, height: usize, settings: RasterSettings, camera: Camera) -> Self {
        let framebuffer = Framebuffer::new(width, height, settings.pixel_format);
        let projection = camera.projection(framebuffer.width, framebuffer.height);
        Self {
            framebuffer,
            camera,
            settings,
            entities: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            projection,
            scratch: Scratch::default(),
        }
    }

    /// Take over a loaded scene. Returns the renderer and the per-entity
    /// spin rates.
    pub fn from_scene(scene: Scene, width: usize, height: usize) -> (Self, Vec<f32>) {
        let mut renderer = Self::new(width, height, scene.settings, scene.camera);
        renderer.entities = scene.entities;
        renderer.textures = scene.textures;
        renderer.materials = scene.materials;
        (renderer, scene.spins)
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Reallocate the framebuffer and rebuild the projection. Must only be
    /// called between frames.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width.max(1) == self.width() && height.max(1) == self.height() {
            return;
        }
        self.framebuffer.resize(width, height);
        self.projection = self.camera.projection(self.width(), self.height());
        log::info!("Framebuffer resized to {}x{}", self.width(), self.height());
    }

    /// Texture bound to a material, if both indices resolve and the texture
    /// has pixels
    pub fn texture_for(&self, material_index: usize) -> Option<&Texture> {
        lookup_texture(&self.materials, &self.textures, material_index)
    }

    /// Clear, refresh the camera and draw every entity
    pub fn render_frame(&mut self) -> FrameStats {
        let Self {
            framebuffer,
            camera,
            settings,
            entities,
            textures,
            materials,
            projection,
            scratch,
        } = self;

        framebuffer.clear(settings.clear_color);
        camera.update(framebuffer.width, framebuffer.height);
        // fov may have changed since the last resize
        *projection = camera.projection(framebuffer.width, framebuffer.height);

        let mut stats = FrameStats::default();
        for entity in entities.iter() {
            let texture = lookup_texture(materials, textures, entity.material_index);
            draw_entity(framebuffer, camera, settings, projection, scratch, entity, texture, &mut stats);
        }

        log::trace!("{:?}", stats);
        stats
    }
}

fn lookup_texture<'a>(
    materials: &[Material],
    textures: &'a [Texture],
    material_index: usize,
) -> Option<&'a Texture> {
    let material = materials.get(material_index)?;
    textures
        .get(material.texture_index)
        .filter(|tex| !tex.pixels.is_empty())
}

#[allow(clippy::too_many_arguments)]
fn draw_entity(
    fb: &mut Framebuffer,
    camera: &Camera,
    settings: &RasterSettings,
    projection: &Mat4,
    scratch: &mut Scratch,
    entity: &RenderEntity,
    texture: Option<&Texture>,
    stats: &mut FrameStats,
) {
    let model = entity.transform.model_matrix();
    let normal_matrix = entity.transform.normal_matrix();

    // Gouraud needs vertex normals; without them fall back to flat
    let shading = match settings.shading {
        ShadingMode::Gouraud if !entity.attributes().contains(VertexAttributes::NORMAL) => ShadingMode::Flat,
        mode => mode,
    };

    let Scratch { world, screen, clipper } = scratch;

    for face in &entity.faces {
        stats.faces += 1;

        // Local -> world
        entity.gather_face(face, world);
        if world.len() < 3 {
            stats.degenerate += 1;
            continue;
        }
        for v in world.iter_mut() {
            v.position = v.position * model;
            v.normal = (v.normal * normal_matrix).normalize();
        }

        match shading {
            ShadingMode::None => {}
            ShadingMode::Flat => {
                let n = face_normal(
                    world[0].position.xyz(),
                    world[1].position.xyz(),
                    world[2].position.xyz(),
                );
                for v in world.iter_mut() {
                    v.color = shade(v.color, n, settings.ambient, &settings.light);
                }
            }
            ShadingMode::Gouraud => {
                for v in world.iter_mut() {
                    v.color = shade(v.color, v.normal.xyz(), settings.ambient, &settings.light);
                }
            }
        }

        // World -> camera
        for v in world.iter_mut() {
            v.position = v.position * camera.view;
        }

        if settings.backface_cull && is_backface(world) {
            stats.culled += 1;
            continue;
        }

        let Some(clipped) = clipper.clip(world, &camera.planes) else {
            stats.clipped += 1;
            continue;
        };

        // Camera -> clip -> screen
        screen.clear();
        for v in clipped {
            let clip = Vertex { position: v.position * *projection, ..*v };
            match project_to_screen(&clip, fb.width, fb.height) {
                Some(s) => screen.push(s),
                None => break,
            }
        }
        if screen.len() != clipped.len() {
            stats.degenerate += 1;
            continue;
        }

        for tri in fan_triangles(screen) {
            stats.pixels += fill_triangle(fb, &tri, texture);
            stats.triangles += 1;
        }

        if settings.wireframe {
            let edge_color = settings.wireframe_color;
            for tri in fan_triangles(screen) {
                stroke_triangle(fb, &tri.map(|v| v.with_color(edge_color)));
            }
        }
    }
}
