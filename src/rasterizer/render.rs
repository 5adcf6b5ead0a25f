//! Core rendering functions
//! Scanline triangle fill with perspective-correct attributes, wireframe
//! stroke, backface test and directional lighting

use super::framebuffer::Framebuffer;
use super::math::{lerp, Vec3, Vec4};
use super::types::{Color, DirectionalLight, Texture, Vertex};

/// Pixels whose final alpha falls below this are discarded
pub const ALPHA_CUTOFF: f32 = 0.1;

/// Screen coordinates beyond this magnitude are rejected by
/// [`fill_triangle`] so scanline and span arithmetic stays inside `i32`
pub const MAX_SCREEN_COORD: f32 = (1 << 24) as f32;

/// Map a clip-space vertex to screen space.
///
/// x/y are divided by w and scaled to pixels, z becomes `1/w`. The
/// projection matrix negates x, so both axes are flipped back here: camera
/// +x lands on the right edge and camera +y on the top row. Returns `None`
/// for a vertex on the w = 0 plane.
pub fn project_to_screen(v: &Vertex, width: usize, height: usize) -> Option<Vertex> {
    let p = v.position;
    if p.w.abs() < f32::EPSILON {
        return None;
    }
    let z_inv = 1.0 / p.w;
    let position = Vec4::new(
        (-p.x * z_inv + 1.0) * width as f32 / 2.0,
        (-p.y * z_inv + 1.0) * height as f32 / 2.0,
        z_inv,
        1.0,
    );
    Some(Vertex { position, ..*v })
}

/// Unit normal of the plane through three points: `cross(p1 - p2, p1 - p3)`
pub fn face_normal(p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
    (p1 - p2).cross(p1 - p3).normalize()
}

/// True when a camera-space polygon faces away from a viewer at the
/// origin. Polygons with fewer than three vertices count as back-facing.
pub fn is_backface(polygon: &[Vertex]) -> bool {
    let [a, b, c, ..] = polygon else {
        return true;
    };
    let p1 = a.position.xyz();
    let n = face_normal(p1, b.position.xyz(), c.position.xyz());
    n.dot(p1) > 0.0
}

/// Lambert term for a surface normal, clamped to 0..1
pub fn light_intensity(normal: Vec3, light: &DirectionalLight) -> f32 {
    let to_light = (-light.direction).normalize();
    to_light.dot(normal.normalize()).clamp(0.0, 1.0)
}

/// `base * (ambient + diffuse * intensity)`, clamped per channel
pub fn shade(base: Color, normal: Vec3, ambient: Color, light: &DirectionalLight) -> Color {
    let intensity = light_intensity(normal, light);
    let diffuse = light.diffuse.to_vec3() * intensity;
    let light_rgb = ambient.to_vec3() + diffuse;
    base.with_rgb(base.to_vec3().mul_elem(light_rgb)).clamp()
}

/// Split a convex polygon into a triangle fan around vertex 0
pub fn fan_triangles(polygon: &[Vertex]) -> impl Iterator<Item = [Vertex; 3]> + '_ {
    (1..polygon.len().saturating_sub(1)).map(move |j| [polygon[0], polygon[j], polygon[j + 1]])
}

/// Fill a screen-space triangle.
///
/// Attributes are premultiplied by each vertex's `1/w` (stored in
/// `position.z`), interpolated linearly along scanlines, and divided by the
/// interpolated `1/w` per pixel. A pixel is written only when its `1/w` is
/// larger (nearer) than the stored depth and the modulated texel keeps
/// alpha >= [`ALPHA_CUTOFF`]. Returns the number of pixels written.
/// Triangles with non-finite coordinates or x/y beyond
/// [`MAX_SCREEN_COORD`] write nothing.
pub fn fill_triangle(fb: &mut Framebuffer, triangle: &[Vertex; 3], texture: Option<&Texture>) -> usize {
    let in_range = |v: &Vertex| {
        v.position.is_finite()
            && v.position.x.abs() <= MAX_SCREEN_COORD
            && v.position.y.abs() <= MAX_SCREEN_COORD
    };
    if !triangle.iter().all(in_range) {
        return 0;
    }

    // Stable sort keeps tied vertices in input order
    let mut sorted = *triangle;
    sorted.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
    let [v1, v2, v3] = sorted.map(|v| v.scale_attributes(v.position.z));

    let p1y = v1.position.y.floor() as i32;
    let p2y = v2.position.y.floor() as i32;
    let p3y = v3.position.y.floor() as i32;

    let width = fb.width as i32;
    let mut written = 0;

    for y in p1y.max(0)..p3y.min(fb.height as i32) {
        let vl = if y < p2y {
            v1.lerp(&v2, (y - p1y) as f32 / (p2y - p1y) as f32)
        } else {
            v2.lerp(&v3, (y - p2y) as f32 / (p3y - p2y) as f32)
        };
        let vr = v1.lerp(&v3, (y - p1y) as f32 / (p3y - p1y) as f32);

        let (vl, vr) = if vl.position.x > vr.position.x { (vr, vl) } else { (vl, vr) };

        let xl = vl.position.x.floor() as i32;
        let xr = vr.position.x.floor() as i32;

        for x in xl.max(0)..xr.min(width) {
            let t = (x - xl) as f32 / (xr - xl) as f32;
            let z_inv = lerp(vl.position.z, vr.position.z, t);
            if z_inv <= fb.get_depth(x, y) {
                continue;
            }

            let v = vl.lerp(&vr, t).scale_attributes(1.0 / z_inv);

            let texel = match texture {
                Some(tex) => tex.sample(v.texcoord.u(), v.texcoord.v()),
                None => Color::WHITE,
            };
            let c = texel.modulate(v.color);
            if c.a < ALPHA_CUTOFF {
                continue;
            }

            fb.set_depth(x, y, z_inv);
            fb.set_pixel(x, y, c);
            written += 1;
        }
    }

    written
}

/// Outline a screen-space triangle. Each edge takes the color of its start
/// vertex.
pub fn stroke_triangle(fb: &mut Framebuffer, triangle: &[Vertex; 3]) {
    for i in 0..3 {
        let start = &triangle[i];
        let end = &triangle[(i + 1) % 3];
        fb.draw_line(
            start.position.x as i32,
            start.position.y as i32,
            end.position.x as i32,
            end.position.y as i32,
            start.color,
        );
    }
}
