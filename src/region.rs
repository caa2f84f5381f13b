// The committed annotation area and the accumulator that edits it.
//
// A Region is a coverage mask at least as large as the surface. Drawing fills
// a stroke polygon straight into it. Erasing goes through the Compositor: the
// region is painted into the working buffer, the stroke is composited
// destination-out on top, and the result is scanned back pixel by pixel into
// unit cells. That scan is O(width x height) per erase stroke whatever the
// polygon looks like, and subtraction is only as accurate as the pixel grid.
//
// The mask extent only ever grows. A smaller window clips what is shown, not
// what is stored, so growing the window again brings every cell back.

use image::{GrayImage, Luma, imageops};
use tracing::debug;

use crate::raster::{self, CLEAR, COVERED, CompositeOp, Compositor};
use crate::types::{Mode, Polygon, SurfaceSize};

/// Set of covered pixel cells. Two regions are equal when they cover the
/// same cells, whatever their mask extents.
#[derive(Clone, Debug)]
pub struct Region {
    mask: GrayImage,
}

impl Region {
    pub fn empty(size: SurfaceSize) -> Self {
        Self { mask: raster::blank_mask(size) }
    }

    /// Extent of the backing mask, which may exceed the visible surface.
    pub fn size(&self) -> SurfaceSize {
        let (w, h) = self.mask.dimensions();
        SurfaceSize::new(w as usize, h as usize)
    }

    /// Out-of-bounds cells are never covered.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        let (w, h) = self.mask.dimensions();
        x < w && y < h && raster::is_covered(&self.mask, x, y)
    }

    pub fn covered_count(&self) -> usize {
        self.mask.pixels().filter(|p| p.0[0] > CLEAR).count()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.pixels().all(|p| p.0[0] == CLEAR)
    }

    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Same cells on a mask covering at least `size`, anchored at the
    /// top-left and padded with uncovered cells. Never crops.
    pub fn grown_to(&self, size: SurfaceSize) -> Region {
        let current = self.size();
        let extent = SurfaceSize::new(current.width.max(size.width), current.height.max(size.height));
        if extent == current {
            return self.clone();
        }
        let mut mask = raster::blank_mask(extent);
        imageops::replace(&mut mask, &self.mask, 0, 0);
        Region { mask }
    }

    /// Rebuild from a composited working buffer, one unit cell per covered pixel.
    fn rederive_from(&mut self, buffer: &GrayImage) {
        let (w, h) = buffer.dimensions();
        let mut mask = GrayImage::new(w, h);
        for (x, y, px) in buffer.enumerate_pixels() {
            if px.0[0] > CLEAR {
                mask.put_pixel(x, y, Luma([COVERED]));
            }
        }
        self.mask = mask;
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        let (w, h) = self.mask.dimensions();
        let (ow, oh) = other.mask.dimensions();
        (0..h.max(oh)).all(|y| (0..w.max(ow)).all(|x| self.contains(x, y) == other.contains(x, y)))
    }
}

impl Eq for Region {}

/// Owns the live region and the scratch buffer used to edit it.
#[derive(Debug)]
pub struct PathAccumulator {
    region: Region,
    compositor: Compositor,
}

impl PathAccumulator {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            region: Region::empty(size),
            compositor: Compositor::new(size),
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Draw mode: every cell covered by the region or the polygon.
    pub fn union(&mut self, polygon: &Polygon) {
        raster::fill_polygon(&mut self.region.mask, polygon, CompositeOp::SourceOver);
    }

    /// Erase mode: cells covered by the polygon become uncovered.
    pub fn subtract(&mut self, polygon: &Polygon) {
        self.compositor.ensure_size(self.region.size());
        self.compositor.clear();
        self.compositor.draw_mask(&self.region.mask);
        self.compositor.fill(polygon, CompositeOp::DestinationOut);
        self.region.rederive_from(self.compositor.buffer());
    }

    pub fn apply(&mut self, mode: Mode, polygon: &Polygon) {
        match mode {
            Mode::Draw => self.union(polygon),
            Mode::Erase => self.subtract(polygon),
        }
        debug!(?mode, covered = self.region.covered_count(), "stroke committed");
    }

    /// Adopt a region (e.g. from history) on the current mask extent.
    pub fn restore(&mut self, region: &Region) {
        self.region = region.grown_to(self.region.size());
    }

    pub fn clear(&mut self) {
        self.region = Region::empty(self.region.size());
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.region = self.region.grown_to(size);
        self.compositor.ensure_size(self.region.size());
    }
}
