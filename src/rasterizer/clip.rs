//! Sutherland-Hodgman polygon clipping against camera-space planes

use super::math::Plane;
use super::types::Vertex;

/// Clip `input` against one plane, writing the surviving polygon to `out`.
///
/// `out` is cleared first. Edges wrap around (vertex i connects to
/// vertex (i + 1) % n). Every attribute of an edge/plane intersection is
/// interpolated. Returns the output vertex count, which lies in `0..=2n`.
pub fn clip_polygon(out: &mut Vec<Vertex>, input: &[Vertex], plane: &Plane) -> usize {
    out.clear();

    let Some(first) = input.first() else {
        return 0;
    };

    let mut current_dot = plane.dot(first.position.xyz());
    let mut current_inside = current_dot >= plane.distance;

    for (i, current) in input.iter().enumerate() {
        let next = &input[(i + 1) % input.len()];

        if current_inside {
            out.push(*current);
        }

        let next_dot = plane.dot(next.position.xyz());
        let next_inside = next_dot >= plane.distance;

        if current_inside != next_inside {
            let t = (plane.distance - current_dot) / (next_dot - current_dot);
            out.push(current.lerp(next, t));
        }

        current_dot = next_dot;
        current_inside = next_inside;
    }

    out.len()
}

/// Reusable scratch buffers for clipping a polygon against a plane list.
///
/// Each stage reads one buffer and writes the other, so input and output
/// never alias.
#[derive(Debug, Default)]
pub struct Clipper {
    front: Vec<Vertex>,
    back: Vec<Vertex>,
}

impl Clipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clip `polygon` against every plane in order. Returns `None` as soon
    /// as fewer than three vertices survive.
    pub fn clip(&mut self, polygon: &[Vertex], planes: &[Plane]) -> Option<&[Vertex]> {
        self.front.clear();
        self.front.extend_from_slice(polygon);
        if self.front.len() < 3 {
            return None;
        }

        for plane in planes {
            let count = clip_polygon(&mut self.back, &self.front, plane);
            std::mem::swap(&mut self.front, &mut self.back);
            if count < 3 {
                return None;
            }
        }

        Some(&self.front)
    }
}
