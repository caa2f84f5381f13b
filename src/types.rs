// Core value types shared by the session, the rasterizer and the window shell.

/// Pixel buffer the window presents; each entry is 0x00RRGGBB for minifb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // length = width * height
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Reallocate only when the size actually changed.
    pub fn resize(&mut self, size: SurfaceSize) {
        if self.width == size.width && self.height == size.height {
            return;
        }
        self.width = size.width;
        self.height = size.height;
        self.pixels = vec![0u32; size.width * size.height];
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }
}

/// Drawing surface dimensions in pixels. Zero in either axis is not a usable
/// surface; the session treats it as "wait for a real size".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: usize,
    pub height: usize,
}

impl SurfaceSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Canvas coordinates. Pixel (x, y) spans [x, x+1) x [y, y+1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_sq(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(&self, other: Point) -> f32 {
        self.distance_sq(other).sqrt()
    }
}

/// Fewer points than this on release is a tap, not a stroke.
pub const MIN_STROKE_POINTS: usize = 3;

/// Open stroke in capture order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    pub fn starting_at(start: Point) -> Self {
        Self { points: vec![start] }
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
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

    /// Close into a polygon; `None` for strokes too short to commit.
    pub fn close(self) -> Option<Polygon> {
        Polygon::new(self.points)
    }
}

/// Closed outline; the last point connects back to the first.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.len() < MIN_STROKE_POINTS {
            return None;
        }
        Some(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Closed edges, including last -> first.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// What a completed stroke does to the region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Draw,
    Erase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_polyline_does_not_close() {
        let mut line = Polyline::starting_at(Point::new(0.0, 0.0));
        line.push(Point::new(5.0, 5.0));
        assert!(line.close().is_none());
    }

    #[test]
    fn polygon_edges_wrap_around() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 3.0),
        ])
        .unwrap();
        let edges: Vec<_> = poly.edges().collect();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2], (Point::new(0.0, 3.0), Point::new(0.0, 0.0)));
    }

    #[test]
    fn frame_buffer_resize_keeps_allocation_when_unchanged() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.pixels[0] = 0x00_12_34_56;
        fb.resize(SurfaceSize::new(4, 3));
        assert_eq!(fb.pixels[0], 0x00_12_34_56);
        fb.resize(SurfaceSize::new(2, 2));
        assert_eq!(fb.pixels.len(), 4);
        assert_eq!(fb.get(2, 0), None);
    }

    #[test]
    fn zero_sized_surface_is_not_drawable() {
        assert!(!SurfaceSize::new(0, 10).is_drawable());
        assert!(SurfaceSize::new(1, 1).is_drawable());
    }
}
