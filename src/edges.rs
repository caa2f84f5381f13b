// Boundary pixels of a coverage surface, for the magnetic snap.
// Rebuilt from scratch whenever the surface changes; never patched in place.

use image::GrayImage;

use crate::types::Point;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeIndex {
    points: Vec<Point>, // row-major scan order
}

impl EdgeIndex {
    /// Opaque interior pixels with at least one fully transparent 4-neighbour.
    /// The outer one-pixel border is never classified.
    pub fn build(surface: &GrayImage) -> Self {
        let (w, h) = surface.dimensions();
        let mut points = Vec::new();
        if w < 3 || h < 3 {
            return Self { points };
        }
        let alpha = |x: u32, y: u32| surface.get_pixel(x, y).0[0];
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                if alpha(x, y) == 0 {
                    continue;
                }
                if alpha(x - 1, y) == 0
                    || alpha(x + 1, y) == 0
                    || alpha(x, y - 1) == 0
                    || alpha(x, y + 1) == 0
                {
                    points.push(Point::new(x as f32, y as f32));
                }
            }
        }
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closest edge pixel, or `None` when it is farther than `threshold`.
    /// Equal distances resolve to the earlier pixel in scan order.
    pub fn nearest(&self, point: Point, threshold: f32) -> Option<Point> {
        let mut best: Option<(Point, f32)> = None;
        for &edge in &self.points {
            let d2 = edge.distance_sq(point);
            if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                best = Some((edge, d2));
            }
        }
        best.filter(|&(_, d2)| d2 <= threshold * threshold)
            .map(|(edge, _)| edge)
    }
}
