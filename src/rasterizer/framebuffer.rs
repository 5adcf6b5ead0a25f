//! Color + depth planes for software rendering

use std::path::Path;
use thiserror::Error;

use super::types::{Color, PixelFormat};

/// Depth value representing "infinitely far". Stored depths are `1/w`, so
/// any visible pixel has a larger value.
pub const DEPTH_FAR: f32 = 0.0;

/// Error type for writing framebuffer snapshots
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("framebuffer size {width}x{height} does not fit an image")]
    Size { width: usize, height: usize },
}

/// Framebuffer for software rendering.
///
/// `color` and `depth` always hold `width * height` elements; they are only
/// reallocated together through [`Framebuffer::resize`].
pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub color: Vec<u32>,    // Packed in `format`
    pub depth: Vec<f32>,    // 1/w, larger = nearer
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            format,
            color: vec![0; width * height],
            depth: vec![DEPTH_FAR; width * height],
        }
    }

    /// Reallocate both planes. A no-op when the size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.color = vec![0; width * height];
        self.depth = vec![DEPTH_FAR; width * height];
    }

    pub fn clear_color(&mut self, color: Color) {
        let c = color.to_u32(self.format);
        self.color.fill(c);
    }

    pub fn clear_depth(&mut self, depth: f32) {
        self.depth.fill(depth);
    }

    pub fn clear(&mut self, color: Color) {
        self.clear_color(color);
        self.clear_depth(DEPTH_FAR);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Write a pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.color[idx] = color.to_u32(self.format);
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color[idx])
    }

    /// Read a pixel back as a float color
    pub fn get_color(&self, x: i32, y: i32) -> Option<Color> {
        self.get_pixel(x, y).map(|c| Color::from_u32(c, self.format))
    }

    pub fn set_depth(&mut self, x: i32, y: i32, depth: f32) {
        if let Some(idx) = self.index(x, y) {
            self.depth[idx] = depth;
        }
    }

    /// Stored depth at (x, y). Off-screen reads return infinity so that
    /// nothing passes the depth test there.
    pub fn get_depth(&self, x: i32, y: i32) -> f32 {
        match self.index(x, y) {
            Some(idx) => self.depth[idx],
            None => f32::INFINITY,
        }
    }

    /// Draw a line with integer error accumulation. The end pixel is not
    /// drawn, so closed outlines do not double-plot their corners.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x1 >= x0 { 1 } else { -1 };
        let sy = if y1 >= y0 { 1 } else { -1 };

        let mut x = x0;
        let mut y = y0;
        let mut err = 0;

        if dx > dy {
            for _ in 0..dx {
                self.set_pixel(x, y, color);
                x += sx;
                err += dy;
                if err > dx {
                    y += sy;
                    err -= dx;
                }
            }
        } else {
            for _ in 0..dy {
                self.set_pixel(x, y, color);
                y += sy;
                err += dx;
                if err > dy {
                    x += sx;
                    err -= dy;
                }
            }
        }
    }

    /// Color plane as RGBA8 bytes, row 0 at the top
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|&c| Color::from_u32(c, self.format).to_bytes())
            .collect()
    }

    /// Write the color plane to an image file (format from the extension)
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let size_err = || SnapshotError::Size { width: self.width, height: self.height };
        let width = u32::try_from(self.width).map_err(|_| size_err())?;
        let height = u32::try_from(self.height).map_err(|_| size_err())?;

        let img = image::RgbaImage::from_raw(width, height, self.to_rgba_bytes())
            .ok_or_else(size_err)?;
        img.save(path)?;
        Ok(())
    }
}
