// Coverage rasterization: polygons onto 8-bit masks, plus the off-surface
// working buffer the erase path composites in.

use image::{GrayImage, Luma};

use crate::types::{Polygon, SurfaceSize};

/// Mask value of a covered pixel. Anything above zero counts as covered.
pub const COVERED: u8 = 255;
/// Mask value of an uncovered pixel.
pub const CLEAR: u8 = 0;

/// How a fill combines with what is already in the mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeOp {
    /// Covered wherever the source covers (paint on top).
    SourceOver,
    /// Uncovered wherever the source covers (punch a hole).
    DestinationOut,
}

/// Empty mask of the given surface size.
pub fn blank_mask(size: SurfaceSize) -> GrayImage {
    GrayImage::new(size.width as u32, size.height as u32)
}

#[inline]
pub fn is_covered(mask: &GrayImage, x: u32, y: u32) -> bool {
    mask.get_pixel(x, y).0[0] > CLEAR
}

/// Fill `polygon` into `mask` with the nonzero winding rule, sampling at
/// pixel centers. Pixels outside the mask are clipped.
pub fn fill_polygon(mask: &mut GrayImage, polygon: &Polygon, op: CompositeOp) {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let value = Luma([match op {
        CompositeOp::SourceOver => COVERED,
        CompositeOp::DestinationOut => CLEAR,
    }]);

    let (min_y, max_y) = polygon
        .points()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    // Rows whose center lies inside [min_y, max_y].
    let first_row = (min_y - 0.5).ceil().max(0.0);
    let last_row = (max_y - 0.5).floor().min(h as f32 - 1.0);
    if last_row < first_row {
        return;
    }

    let mut crossings: Vec<(f32, i32)> = Vec::with_capacity(polygon.points().len());
    for row in first_row as u32..=last_row as u32 {
        let yc = row as f32 + 0.5;
        crossings.clear();
        for (a, b) in polygon.edges() {
            let dir = if a.y <= yc && b.y > yc {
                1
            } else if b.y <= yc && a.y > yc {
                -1
            } else {
                continue;
            };
            let x = a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y);
            crossings.push((x, dir));
        }
        crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            if winding == 0 {
                continue;
            }
            // Pixel centers in [xa, xb).
            let start = (pair[0].0 - 0.5).ceil().max(0.0);
            let end = ((pair[1].0 - 0.5).ceil() - 1.0).min(w as f32 - 1.0);
            if end < start {
                continue;
            }
            for col in start as u32..=end as u32 {
                mask.put_pixel(col, row, value);
            }
        }
    }
}

/// Off-surface buffer at full canvas resolution. Erase strokes are composited
/// here and the result is scanned back into the region.
#[derive(Debug)]
pub struct Compositor {
    buffer: GrayImage,
}

impl Compositor {
    pub fn new(size: SurfaceSize) -> Self {
        Self { buffer: blank_mask(size) }
    }

    /// Match the canvas size; contents are discarded on change.
    pub fn ensure_size(&mut self, size: SurfaceSize) {
        if self.buffer.dimensions() != (size.width as u32, size.height as u32) {
            self.buffer = blank_mask(size);
        }
    }

    pub fn clear(&mut self) {
        for px in self.buffer.pixels_mut() {
            px.0[0] = CLEAR;
        }
    }

    /// Source-over a coverage mask of the same size.
    pub fn draw_mask(&mut self, mask: &GrayImage) {
        debug_assert_eq!(mask.dimensions(), self.buffer.dimensions());
        for (dst, src) in self.buffer.pixels_mut().zip(mask.pixels()) {
            if src.0[0] > CLEAR {
                dst.0[0] = COVERED;
            }
        }
    }

    pub fn fill(&mut self, polygon: &Polygon, op: CompositeOp) {
        fill_polygon(&mut self.buffer, polygon, op);
    }

    pub fn buffer(&self) -> &GrayImage {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Polygon {
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
        .unwrap()
    }

    fn covered_count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] > CLEAR).count()
    }

    #[test]
    fn axis_aligned_square_covers_exact_cells() {
        let mut mask = blank_mask(SurfaceSize::new(20, 20));
        fill_polygon(&mut mask, &square(2.0, 3.0, 6.0, 8.0), CompositeOp::SourceOver);
        assert_eq!(covered_count(&mask), 4 * 5);
        assert!(is_covered(&mask, 2, 3));
        assert!(is_covered(&mask, 5, 7));
        assert!(!is_covered(&mask, 6, 7));
        assert!(!is_covered(&mask, 5, 8));
    }

    #[test]
    fn winding_direction_does_not_matter() {
        let mut cw = blank_mask(SurfaceSize::new(16, 16));
        let mut ccw = blank_mask(SurfaceSize::new(16, 16));
        let pts = vec![
            Point::new(1.0, 1.0),
            Point::new(12.0, 2.0),
            Point::new(7.0, 13.0),
        ];
        let mut rev = pts.clone();
        rev.reverse();
        fill_polygon(&mut cw, &Polygon::new(pts).unwrap(), CompositeOp::SourceOver);
        fill_polygon(&mut ccw, &Polygon::new(rev).unwrap(), CompositeOp::SourceOver);
        assert_eq!(cw, ccw);
        assert!(covered_count(&cw) > 0);
    }

    #[test]
    fn fill_is_clipped_to_mask() {
        let mut mask = blank_mask(SurfaceSize::new(10, 10));
        fill_polygon(&mut mask, &square(-5.0, -5.0, 50.0, 50.0), CompositeOp::SourceOver);
        assert_eq!(covered_count(&mask), 100);
    }

    #[test]
    fn polygon_fully_outside_touches_nothing() {
        let mut mask = blank_mask(SurfaceSize::new(10, 10));
        fill_polygon(&mut mask, &square(20.0, 20.0, 30.0, 30.0), CompositeOp::SourceOver);
        fill_polygon(&mut mask, &square(-30.0, -30.0, -20.0, -20.0), CompositeOp::SourceOver);
        assert_eq!(covered_count(&mask), 0);
    }

    #[test]
    fn destination_out_punches_a_hole() {
        let mut comp = Compositor::new(SurfaceSize::new(12, 12));
        comp.fill(&square(0.0, 0.0, 12.0, 12.0), CompositeOp::SourceOver);
        comp.fill(&square(4.0, 4.0, 8.0, 8.0), CompositeOp::DestinationOut);
        assert_eq!(covered_count(comp.buffer()), 144 - 16);
        assert!(!is_covered(comp.buffer(), 5, 5));
        assert!(is_covered(comp.buffer(), 3, 5));
    }

    #[test]
    fn degenerate_flat_polygon_covers_nothing() {
        let mut mask = blank_mask(SurfaceSize::new(10, 10));
        let flat = Polygon::new(vec![
            Point::new(1.0, 4.5),
            Point::new(5.0, 4.5),
            Point::new(9.0, 4.5),
        ])
        .unwrap();
        fill_polygon(&mut mask, &flat, CompositeOp::SourceOver);
        assert_eq!(covered_count(&mask), 0);
    }
}
