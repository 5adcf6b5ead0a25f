//! Core types for the rasterizer

use bitflags::bitflags;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::math::{lerp, Vec2, Vec3, Vec4};

/// Channel order used when packing a color into a `u32`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// `0xRRGGBBAA`
    Rgba,
    /// `0xAARRGGBB`
    #[default]
    Argb,
    /// `0xAABBGGRR`, which is RGBA8 byte order on little-endian machines
    Abgr,
}

/// RGBA color, normalized floats (0.0-1.0 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

fn channel_to_u8(c: f32) -> u32 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u32
}

fn channel_from_u8(c: u32) -> f32 {
    (c & 0xff) as f32 / 255.0
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
    pub const BLUE: Color = Color { r: 0.0, g: 0.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            r: bytes[0] as f32 / 255.0,
            g: bytes[1] as f32 / 255.0,
            b: bytes[2] as f32 / 255.0,
            a: bytes[3] as f32 / 255.0,
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [
            channel_to_u8(self.r) as u8,
            channel_to_u8(self.g) as u8,
            channel_to_u8(self.b) as u8,
            channel_to_u8(self.a) as u8,
        ]
    }

    /// The color channels as a vector (alpha dropped)
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn with_rgb(self, rgb: Vec3) -> Self {
        Self { r: rgb.x, g: rgb.y, b: rgb.z, a: self.a }
    }

    /// Multiply the color channels by `s`, alpha untouched
    pub fn scale_rgb(self, s: f32) -> Self {
        Self { r: self.r * s, g: self.g * s, b: self.b * s, a: self.a }
    }

    /// Multiply the color channels component-wise, alpha taken from `self`
    pub fn modulate(self, other: Color) -> Self {
        Self {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
            a: self.a,
        }
    }

    pub fn clamp(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
            a: lerp(self.a, other.a, t),
        }
    }

    /// Pack into a `u32` in the given channel order. Channels are clamped.
    pub fn to_u32(self, format: PixelFormat) -> u32 {
        let r = channel_to_u8(self.r);
        let g = channel_to_u8(self.g);
        let b = channel_to_u8(self.b);
        let a = channel_to_u8(self.a);
        match format {
            PixelFormat::Rgba => r << 24 | g << 16 | b << 8 | a,
            PixelFormat::Argb => a << 24 | r << 16 | g << 8 | b,
            PixelFormat::Abgr => a << 24 | b << 16 | g << 8 | r,
        }
    }

    pub fn from_u32(packed: u32, format: PixelFormat) -> Self {
        let (r, g, b, a) = match format {
            PixelFormat::Rgba => (packed >> 24, packed >> 16, packed >> 8, packed),
            PixelFormat::Argb => (packed >> 16, packed >> 8, packed, packed >> 24),
            PixelFormat::Abgr => (packed, packed >> 8, packed >> 16, packed >> 24),
        };
        Self {
            r: channel_from_u8(r),
            g: channel_from_u8(g),
            b: channel_from_u8(b),
            a: channel_from_u8(a),
        }
    }
}

/// Error type for texture loading
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("texture `{name}` has no pixels")]
    Empty { name: String },
}

/// Simple texture (array of colors), row 0 at the top
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self::solid(width, height, Color::WHITE)
    }

    pub fn solid(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            name: String::new(),
        }
    }

    /// Load texture from an image file (PNG, JPEG, BMP, TGA)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let tex = Self::from_bytes(&bytes, name)?;
        log::info!("Loaded texture: {} ({}x{})", tex.name, tex.width, tex.height);
        Ok(tex)
    }

    /// Load texture from encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        if width == 0 || height == 0 {
            return Err(TextureError::Empty { name });
        }

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::from_bytes(p.0))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Mirror each row in place
    pub fn flip_horizontal(&mut self) {
        if self.width == 0 {
            return;
        }
        for row in self.pixels.chunks_exact_mut(self.width) {
            row.reverse();
        }
    }

    /// Swap rows top to bottom in place
    pub fn flip_vertical(&mut self) {
        let w = self.width;
        let h = self.height;
        for y in 0..h / 2 {
            let (top, bottom) = self.pixels.split_at_mut((h - 1 - y) * w);
            top[y * w..(y + 1) * w].swap_with_slice(&mut bottom[..w]);
        }
    }

    /// Nearest-neighbor sample. The texel index is clamped into the pixel
    /// array, so any (u, v) is safe.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.pixels.is_empty() {
            return Color::WHITE;
        }
        let tu = (u * self.width as f32) as i64;
        let tv = (v * self.height as f32) as i64;
        let index = (tv * self.width as i64 + tu).clamp(0, self.pixels.len() as i64 - 1);
        self.pixels[index as usize]
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }
}

bitflags! {
    /// Which optional per-vertex attributes a mesh provides
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VertexAttributes: u8 {
        const TEXCOORD = 0b0001;
        const NORMAL   = 0b0010;
        const COLOR    = 0b0100;
    }
}

/// A pipeline vertex. Built per face and dropped after the draw call.
///
/// `position` is local, world, camera, clip or screen space depending on
/// the stage holding it. In screen space `position.z` is `1/w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec4,
    pub texcoord: Vec2,
    pub normal: Vec4,
    pub color: Color,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec4::point(0.0, 0.0, 0.0),
            texcoord: Vec2::ZERO,
            normal: Vec4::ZERO,
            color: Color::WHITE,
        }
    }
}

impl Vertex {
    pub fn new(position: Vec4, texcoord: Vec2, normal: Vec4, color: Color) -> Self {
        Self { position, texcoord, normal, color }
    }

    pub fn from_pos(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec4::point(x, y, z),
            ..Default::default()
        }
    }

    pub fn with_texcoord(mut self, u: f32, v: f32) -> Self {
        self.texcoord = Vec2::new(u, v);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Interpolate every attribute
    pub fn lerp(&self, other: &Vertex, t: f32) -> Vertex {
        Vertex {
            position: self.position.lerp(other.position, t),
            texcoord: self.texcoord.lerp(other.texcoord, t),
            normal: self.normal.lerp(other.normal, t),
            color: self.color.lerp(other.color, t),
        }
    }

    /// Scale the interpolated attributes (texcoord, normal, color channels)
    /// by `s`. Position and alpha are left alone.
    pub fn scale_attributes(&self, s: f32) -> Vertex {
        Vertex {
            position: self.position,
            texcoord: self.texcoord.scale(s),
            normal: self.normal.scale(s),
            color: self.color.scale_rgb(s),
        }
    }
}

/// Texture indirection shared by entities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub texture_index: usize,
}

impl Material {
    pub fn new(texture_index: usize) -> Self {
        Self { texture_index }
    }
}

/// Infinitely distant light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Direction the light travels in (world space)
    pub direction: Vec3,
    pub diffuse: Color,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(1.0, -1.0, 1.0),
            diffuse: Color::WHITE,
        }
    }
}

/// Shading mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    None,     // No lighting, raw texture/vertex colors
    #[default]
    Flat,     // One light calculation per face (world-space face normal)
    Gouraud,  // Per-vertex lighting, needs mesh normals (falls back to flat)
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Color the framebuffer is cleared to each frame
    pub clear_color: Color,
    /// Constant ambient term added to the diffuse light
    pub ambient: Color,
    pub light: DirectionalLight,
    pub shading: ShadingMode,
    /// Overlay triangle edges after filling
    pub wireframe: bool,
    pub wireframe_color: Color,
    /// Backface culling
    pub backface_cull: bool,
    /// Packing of the framebuffer color plane
    pub pixel_format: PixelFormat,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::rgb(0.819, 0.309, 0.172),
            ambient: Color::rgb(0.4, 0.4, 0.4),
            light: DirectionalLight::default(),
            shading: ShadingMode::Flat,
            wireframe: false,
            wireframe_color: Color::rgb(0.086, 0.086, 0.086),
            backface_cull: true,
            pixel_format: PixelFormat::Argb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> Texture {
        let pixels = (0..width * height)
            .map(|i| Color::new(i as f32, 0.0, 0.0, 1.0))
            .collect();
        Texture { width, height, pixels, name: "numbered".to_string() }
    }

    #[test]
    fn test_pack_formats() {
        let c = Color::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(c.to_u32(PixelFormat::Rgba), 0xff00_00ff);
        assert_eq!(c.to_u32(PixelFormat::Argb), 0xffff_0000);
        assert_eq!(c.to_u32(PixelFormat::Abgr), 0xff00_00ff);

        let g = Color::new(0.0, 1.0, 0.0, 0.0);
        assert_eq!(g.to_u32(PixelFormat::Rgba), 0x00ff_0000);
        assert_eq!(g.to_u32(PixelFormat::Argb), 0x0000_ff00);
    }

    #[test]
    fn test_pack_clamps_channels() {
        let c = Color::new(2.0, -1.0, 0.5, 1.0);
        let bytes = c.to_bytes();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes[1], 0);
        assert_eq!(bytes[2], 128);
    }

    #[test]
    fn test_unpack_matches_pack() {
        let c = Color::new(0.2, 0.4, 0.6, 0.8);
        for format in [PixelFormat::Rgba, PixelFormat::Argb, PixelFormat::Abgr] {
            let back = Color::from_u32(c.to_u32(format), format);
            assert!((back.r - c.r).abs() < 0.01);
            assert!((back.g - c.g).abs() < 0.01);
            assert!((back.b - c.b).abs() < 0.01);
            assert!((back.a - c.a).abs() < 0.01);
        }
    }

    #[test]
    fn test_abgr_is_rgba_bytes_little_endian() {
        let c = Color::from_bytes([10, 20, 30, 40]);
        assert_eq!(c.to_u32(PixelFormat::Abgr).to_le_bytes(), [10, 20, 30, 40]);
    }

    #[test]
    fn test_modulate_keeps_alpha() {
        let texel = Color::new(0.5, 1.0, 1.0, 0.25);
        let lit = Color::new(0.5, 0.5, 0.0, 1.0);
        let c = texel.modulate(lit);
        assert!((c.r - 0.25).abs() < 0.0001);
        assert!((c.g - 0.5).abs() < 0.0001);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 0.25);
    }

    #[test]
    fn test_sample_nearest() {
        let tex = numbered(4, 4);
        assert_eq!(tex.sample(0.0, 0.0).r, 0.0);
        assert_eq!(tex.sample(0.3, 0.0).r, 1.0);
        assert_eq!(tex.sample(0.0, 0.5).r, 8.0);
        assert_eq!(tex.sample(0.99, 0.99).r, 15.0);
    }

    #[test]
    fn test_sample_clamps_out_of_range() {
        let tex = numbered(4, 4);
        assert_eq!(tex.sample(-3.0, -3.0).r, 0.0);
        assert_eq!(tex.sample(5.0, 5.0).r, 15.0);
        assert_eq!(tex.sample(f32::NAN, 0.0).r, 0.0);

        let empty = Texture::solid(0, 0, Color::RED);
        assert_eq!(empty.sample(0.5, 0.5), Color::WHITE);
    }

    #[test]
    fn test_flip_horizontal() {
        let mut tex = numbered(3, 2);
        tex.flip_horizontal();
        let row0: Vec<f32> = tex.pixels[0..3].iter().map(|c| c.r).collect();
        let row1: Vec<f32> = tex.pixels[3..6].iter().map(|c| c.r).collect();
        assert_eq!(row0, vec![2.0, 1.0, 0.0]);
        assert_eq!(row1, vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_flip_vertical() {
        let mut tex = numbered(2, 3);
        tex.flip_vertical();
        let values: Vec<f32> = tex.pixels.iter().map(|c| c.r).collect();
        assert_eq!(values, vec![4.0, 5.0, 2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn test_from_bytes_png() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 128]));
        let mut encoded = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Png)
            .unwrap();

        let tex = Texture::from_bytes(&encoded, "pair".to_string()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.get_pixel(0, 0), Color::RED);
        assert!((tex.get_pixel(1, 0).a - 128.0 / 255.0).abs() < 0.001);
    }

    #[test]
    fn test_from_bytes_garbage_is_error() {
        let result = Texture::from_bytes(b"not an image", "bad".to_string());
        assert!(matches!(result, Err(TextureError::Decode(_))));
    }

    #[test]
    fn test_vertex_lerp_all_attributes() {
        let a = Vertex::new(
            Vec4::point(0.0, 0.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec4::direction(0.0, 0.0, 0.0),
            Color::new(0.0, 0.0, 0.0, 0.0),
        );
        let b = Vertex::new(
            Vec4::point(2.0, 4.0, 6.0),
            Vec2::new(1.0, 1.0),
            Vec4::direction(0.0, 2.0, 0.0),
            Color::new(1.0, 1.0, 1.0, 1.0),
        );
        let m = a.lerp(&b, 0.5);
        assert_eq!(m.position.xyz(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.texcoord, Vec2::new(0.5, 0.5));
        assert_eq!(m.normal.y, 1.0);
        assert_eq!(m.color.a, 0.5);
    }

    #[test]
    fn test_settings_ron_round_trip() {
        let settings = RasterSettings { wireframe: true, ..Default::default() };
        let text = ron::to_string(&settings).unwrap();
        let back: RasterSettings = ron::from_str(&text).unwrap();
        assert_eq!(back, settings);

        let partial: RasterSettings = ron::from_str("(shading: Gouraud)").unwrap();
        assert_eq!(partial.shading, ShadingMode::Gouraud);
        assert!(partial.backface_cull);
    }
}
