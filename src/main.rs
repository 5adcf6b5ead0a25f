//! Bonnie Raster demo viewer
//!
//! Renders a scene on the CPU and blits the framebuffer with macroquad.
//! WASD/QE move, arrow keys turn, F toggles the wireframe overlay,
//! Escape quits. `--snapshot out.png` renders one frame without a window.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use macroquad::prelude::*;

use bonnie_raster::app::{DemoApp, InputState};
use bonnie_raster::rasterizer::{HEIGHT, WIDTH};
use bonnie_raster::world::{load_scene, Scene, SceneDesc};
use bonnie_raster::VERSION;

#[derive(Parser, Debug)]
#[command(name = "bonnie-raster", version, about = "CPU rasterizer demo viewer")]
struct Args {
    /// RON scene file (built-in demo scene when omitted)
    scene: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long, default_value_t = WIDTH as u32 * 2)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = HEIGHT as u32 * 2)]
    height: u32,

    /// Window pixels per framebuffer pixel
    #[arg(long, default_value_t = 2)]
    scale: u32,

    /// Render a single frame to this image file and exit
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl Args {
    fn render_size(&self, width: f32, height: f32) -> (usize, usize) {
        let scale = self.scale.max(1) as f32;
        ((width / scale) as usize, (height / scale) as usize)
    }
}

fn load_or_demo(path: Option<&Path>) -> Scene {
    let Some(path) = path else {
        return SceneDesc::demo().build(Path::new("."));
    };
    match load_scene(path) {
        Ok(desc) => {
            log::info!("Loaded scene {}", path.display());
            desc.build(path.parent().unwrap_or(Path::new(".")))
        }
        Err(e) => {
            log::warn!("Failed to load scene {}: {}, using demo scene", path.display(), e);
            SceneDesc::demo().build(Path::new("."))
        }
    }
}

fn window_conf(args: &Args) -> Conf {
    Conf {
        window_title: format!("Bonnie Raster v{}", VERSION),
        window_width: args.width as i32,
        window_height: args.height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

fn read_input() -> InputState {
    InputState {
        forward: is_key_down(KeyCode::W),
        back: is_key_down(KeyCode::S),
        left: is_key_down(KeyCode::A),
        right: is_key_down(KeyCode::D),
        up: is_key_down(KeyCode::E),
        down: is_key_down(KeyCode::Q),
        turn_left: is_key_down(KeyCode::Left),
        turn_right: is_key_down(KeyCode::Right),
        look_up: is_key_down(KeyCode::Up),
        look_down: is_key_down(KeyCode::Down),
        toggle_wireframe: is_key_pressed(KeyCode::F),
    }
}

async fn run(mut app: DemoApp, args: Args) {
    println!("=== Bonnie Raster ===");

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let screen_w = screen_width();
        let screen_h = screen_height();

        // Resize between frames only
        let (w, h) = args.render_size(screen_w, screen_h);
        app.renderer.resize(w, h);

        app.frame(get_frame_time(), &read_input());

        // Convert framebuffer to texture and stretch it over the window
        let fb = &app.renderer.framebuffer;
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.to_rgba_bytes());
        texture.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(screen_w, screen_h)),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let scene = load_or_demo(args.scene.as_deref());
    let (w, h) = args.render_size(args.width as f32, args.height as f32);
    let mut app = DemoApp::new(scene, w, h);

    if let Some(path) = &args.snapshot {
        app.frame(0.0, &InputState::default());
        return match app.renderer.framebuffer.save_png(path) {
            Ok(()) => {
                log::info!("Wrote snapshot {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to write snapshot {}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    macroquad::Window::from_config(window_conf(&args), run(app, args));
    ExitCode::SUCCESS
}
