// Reference "blob" generator.
//
// A blob is a ring of 10 to 15 jittered anchors around the canvas center,
// joined by quadratic curves. The curves are flattened into a closed outline
// so the blob can be rasterized like any other polygon.

use std::f32::consts::TAU;

use image::GrayImage;

use crate::raster::{self, CompositeOp};
use crate::rng::RandomSource;
use crate::types::{Point, Polygon, SurfaceSize};

/// Smallest blob diameter before the per-anchor jitter.
const MIN_SIZE: f32 = 50.0;
/// Largest blob diameter as a fraction of the shorter canvas side.
const MAX_SIZE_FRACTION: f32 = 0.3;
const MIN_ANCHORS: usize = 10;
const ANCHOR_CHOICES: f32 = 6.0;
/// Line segments per flattened curve.
const CURVE_STEPS: usize = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    pub center: Point,
    /// Diameter before jitter.
    pub size: f32,
    /// On-curve points, one per segment end.
    pub anchors: Vec<Point>,
    /// Flattened closed boundary.
    pub outline: Vec<Point>,
}

impl Blob {
    /// Rasterize the outline onto a fresh coverage mask.
    pub fn rasterize(&self, size: SurfaceSize) -> GrayImage {
        let mut mask = raster::blank_mask(size);
        if let Some(outline) = Polygon::new(self.outline.clone()) {
            raster::fill_polygon(&mut mask, &outline, CompositeOp::SourceOver);
        }
        mask
    }
}

/// Random blob centered on a `width` x `height` canvas.
pub fn generate(width: usize, height: usize, rng: &mut impl RandomSource) -> Blob {
    let center = Point::new(width as f32 / 2.0, height as f32 / 2.0);
    let max_size = width.min(height) as f32 * MAX_SIZE_FRACTION;
    let size = rng.next_f32() * (max_size - MIN_SIZE) + MIN_SIZE;
    let base_radius = size / 2.0;

    let count = MIN_ANCHORS + (rng.next_f32() * ANCHOR_CHOICES) as usize;
    let start_angle = rng.next_f32() * TAU;
    let step = TAU / count as f32;

    let mut radii = Vec::with_capacity(count);
    let mut anchors = Vec::with_capacity(count);
    for i in 0..count {
        let angle = start_angle + i as f32 * step;
        let radius = base_radius * rng.range(0.5, 0.8);
        radii.push(radius);
        anchors.push(polar(center, angle, radius));
    }

    let mut outline = Vec::with_capacity(count * CURVE_STEPS);
    for i in 0..count {
        let next = (i + 1) % count;
        let mid_angle = start_angle + (i as f32 + 0.5) * step;
        let control = polar(center, mid_angle, radii[next] * rng.range(0.9, 1.1));
        flatten_quad(anchors[i], control, anchors[next], &mut outline);
    }

    Blob { center, size, anchors, outline }
}

fn polar(center: Point, angle: f32, radius: f32) -> Point {
    Point::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius)
}

/// Push the curve from `from` (inclusive) to `to` (exclusive).
fn flatten_quad(from: Point, control: Point, to: Point, out: &mut Vec<Point>) {
    for step in 0..CURVE_STEPS {
        let t = step as f32 / CURVE_STEPS as f32;
        let u = 1.0 - t;
        out.push(Point::new(
            u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
            u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
        ));
    }
}
