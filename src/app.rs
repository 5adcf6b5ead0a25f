//! Demo application state
//!
//! Input is sampled by the window layer into an [`InputState`] each frame,
//! so everything here runs without a window.

use crate::renderer::{FrameStats, Renderer};
use crate::world::Scene;

/// World units per second
pub const MOVE_SPEED: f32 = 40.0;
/// Degrees per second
pub const TURN_SPEED: f32 = 90.0;

/// Keys held (or pressed, for toggles) this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub look_up: bool,
    pub look_down: bool,
    /// Edge-triggered
    pub toggle_wireframe: bool,
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Counts frames and reports the rate once per second
#[derive(Debug, Clone, Copy, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    /// Record one frame. Returns the average rate when a full second has
    /// passed.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}

pub struct DemoApp {
    pub renderer: Renderer,
    /// Y rotation speed per entity (degrees/s), parallel to the renderer's
    /// entities
    pub spins: Vec<f32>,
    fps: FpsCounter,
}

impl DemoApp {
    pub fn new(scene: Scene, width: usize, height: usize) -> Self {
        let (renderer, spins) = Renderer::from_scene(scene, width, height);
        log::info!(
            "Scene ready: {} entities, {} textures, {}x{}",
            renderer.entities.len(),
            renderer.textures.len(),
            renderer.width(),
            renderer.height()
        );
        Self {
            renderer,
            spins,
            fps: FpsCounter::default(),
        }
    }

    /// Advance animation and camera by `dt` seconds
    pub fn update(&mut self, dt: f32, input: &InputState) {
        for (entity, spin) in self.renderer.entities.iter_mut().zip(&self.spins) {
            let rot = &mut entity.transform.rotation;
            rot.y = (rot.y + spin * dt) % 360.0;
        }

        let camera = &mut self.renderer.camera;
        camera.rotate(
            axis(input.look_down, input.look_up) * TURN_SPEED * dt,
            axis(input.turn_right, input.turn_left) * TURN_SPEED * dt,
        );

        let step = MOVE_SPEED * dt;
        let motion = camera.forward() * axis(input.forward, input.back)
            + camera.right() * axis(input.right, input.left)
            + camera.up() * axis(input.up, input.down);
        camera.position = camera.position + motion * step;

        if input.toggle_wireframe {
            let settings = &mut self.renderer.settings;
            settings.wireframe = !settings.wireframe;
            log::info!("Wireframe {}", if settings.wireframe { "on" } else { "off" });
        }
    }

    /// Update, render and log the frame rate once per second
    pub fn frame(&mut self, dt: f32, input: &InputState) -> FrameStats {
        self.update(dt, input);
        let stats = self.renderer.render_frame();
        log::debug!(
            "faces {} culled {} clipped {} triangles {} pixels {}",
            stats.faces,
            stats.culled,
            stats.clipped,
            stats.triangles,
            stats.pixels
        );
        if let Some(fps) = self.fps.tick(dt) {
            log::info!("FPS: {:.1}", fps);
        }
        stats
    }
}
