// One annotation session: the reference blob, its edge index, the live
// region, the history and the stroke in progress, all owned in one place.
//
// The UI layer drives it with pointer events and button actions and calls
// AnnotationSession::render_into after anything that changes the picture.
// Nothing here returns an error: degenerate input (taps, undo at the floor,
// zero-sized surfaces) is absorbed as a no-op.

use image::GrayImage;
use tracing::{debug, info};

use crate::edges::EdgeIndex;
use crate::history::History;
use crate::region::{PathAccumulator, Region};
use crate::render;
use crate::rng::{RandomSource, Rng32};
use crate::shape::{self, Blob};
use crate::stroke::{SnapSettings, StrokeCapture};
use crate::types::{FrameBuffer, Mode, Point, Polyline, SurfaceSize};

pub struct AnnotationSession<R: RandomSource = Rng32> {
    size: SurfaceSize,
    rng: R,
    blob: Blob,
    shape_mask: GrayImage,
    edges: EdgeIndex,
    accumulator: PathAccumulator,
    history: History,
    stroke: StrokeCapture,
    mode: Mode,
}

impl<R: RandomSource> AnnotationSession<R> {
    /// Fresh session: new blob, empty region, history holding only the empty
    /// region. A zero dimension is bumped to one pixel.
    pub fn new(size: SurfaceSize, snap: SnapSettings, mut rng: R) -> Self {
        let size = SurfaceSize::new(size.width.max(1), size.height.max(1));
        let blob = shape::generate(size.width, size.height, &mut rng);
        let shape_mask = blob.rasterize(size);
        let edges = EdgeIndex::build(&shape_mask);
        let accumulator = PathAccumulator::new(size);
        let history = History::new(accumulator.region());
        info!(width = size.width, height = size.height, edges = edges.len(), "session started");
        Self {
            size,
            rng,
            blob,
            shape_mask,
            edges,
            accumulator,
            history,
            stroke: StrokeCapture::new(snap),
            mode: Mode::Draw,
        }
    }

    /* ---------------------------- pointer input ---------------------------- */

    pub fn on_pointer_down(&mut self, at: Point) {
        self.stroke.begin(at);
    }

    pub fn on_pointer_move(&mut self, at: Point) {
        self.stroke.extend(at, &self.edges);
    }

    /// Commit the stroke under the active mode and snapshot the result.
    pub fn on_pointer_up(&mut self) {
        let Some(polygon) = self.stroke.finish() else {
            return;
        };
        self.accumulator.apply(self.mode, &polygon);
        self.history.record(self.accumulator.region());
    }

    /// Leaving the surface ends the stroke exactly like releasing.
    pub fn on_pointer_leave(&mut self) {
        self.on_pointer_up();
    }

    /* ---------------------------- tool settings ---------------------------- */

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(?mode, "mode changed");
        }
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_magnetic_snap(&mut self, enabled: bool) {
        self.stroke.snap.enabled = enabled;
        info!("Magnetic lasso {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn toggle_magnetic_snap(&mut self) {
        self.set_magnetic_snap(!self.stroke.snap.enabled);
    }

    pub fn magnetic_snap(&self) -> bool {
        self.stroke.snap.enabled
    }

    /// Negative thresholds clamp to zero (snap only onto the exact pixel).
    pub fn set_magnetic_threshold(&mut self, pixels: i32) {
        self.stroke.snap.threshold = pixels.max(0) as u32;
        info!("Magnetic threshold set to {}", self.stroke.snap.threshold);
    }

    pub fn magnetic_threshold(&self) -> u32 {
        self.stroke.snap.threshold
    }

    /* ------------------------------- actions ------------------------------- */

    /// "New patient": empty region, single-snapshot history, new blob.
    pub fn reset_session(&mut self) {
        self.clear_state();
        self.blob = shape::generate(self.size.width, self.size.height, &mut self.rng);
        self.rebuild_shape_surface();
        info!(edges = self.edges.len(), "new patient");
    }

    /// Clear the annotations but keep the current blob.
    pub fn clear_annotations(&mut self) {
        self.clear_state();
        info!("drawing reset");
    }

    fn clear_state(&mut self) {
        self.stroke.abandon();
        self.accumulator.clear();
        self.history.reset(self.accumulator.region());
    }

    /// Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.accumulator.restore(snapshot.region());
                true
            }
            None => false,
        }
    }

    /// Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.accumulator.restore(snapshot.region());
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /* ------------------------------- surface ------------------------------- */

    /// Follow a host resize. Region and blob survive (the region keeps cells
    /// outside a smaller surface, the blob is re-rasterized, never
    /// regenerated); zero sizes are ignored until a usable size shows up.
    pub fn resize(&mut self, size: SurfaceSize) {
        if !size.is_drawable() {
            debug!(?size, "resize deferred");
            return;
        }
        if size == self.size {
            return;
        }
        debug!(from = ?self.size, to = ?size, "surface resized");
        self.size = size;
        self.accumulator.resize(size);
        self.rebuild_shape_surface();
    }

    fn rebuild_shape_surface(&mut self) {
        self.shape_mask = self.blob.rasterize(self.size);
        self.edges = EdgeIndex::build(&self.shape_mask);
    }

    /// Composite for a surface of `size` (resizing first if needed).
    pub fn render_frame(&mut self, size: SurfaceSize) -> FrameBuffer {
        self.resize(size);
        let mut fb = FrameBuffer::new(self.size.width, self.size.height);
        self.render_into(&mut fb);
        fb
    }

    /// Composite into a reused buffer, resized to the session surface.
    pub fn render_into(&self, fb: &mut FrameBuffer) {
        fb.resize(self.size);
        render::render_scene(fb, &self.shape_mask, self.accumulator.region(), self.stroke.preview());
    }

    /* ------------------------------ inspection ------------------------------ */

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn region(&self) -> &Region {
        self.accumulator.region()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    pub fn edges(&self) -> &EdgeIndex {
        &self.edges
    }

    pub fn is_capturing(&self) -> bool {
        self.stroke.is_capturing()
    }

    pub fn preview(&self) -> Option<&Polyline> {
        self.stroke.preview()
    }

    /// Latest (possibly snapped) stroke point, for the magnifier.
    pub fn stroke_cursor(&self) -> Option<Point> {
        self.stroke.cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Polygon;

    fn session(width: usize, height: usize, snap: bool) -> AnnotationSession {
        AnnotationSession::new(
            SurfaceSize::new(width, height),
            SnapSettings { enabled: snap, threshold: 20 },
            Rng32::from_seed(2024),
        )
    }

    fn stroke<R: RandomSource>(s: &mut AnnotationSession<R>, points: &[(f32, f32)]) {
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            s.on_pointer_down(Point::new(x, y));
        }
        for &(x, y) in iter {
            s.on_pointer_move(Point::new(x, y));
        }
        s.on_pointer_up();
    }

    fn expected(size: SurfaceSize, points: &[(f32, f32)]) -> Region {
        let mut acc = PathAccumulator::new(size);
        let poly = Polygon::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap();
        acc.union(&poly);
        acc.region().clone()
    }

    const TRIANGLE: [(f32, f32); 3] = [(10.0, 10.0), (50.0, 10.0), (30.0, 40.0)];

    #[test]
    fn triangle_stroke_commits_and_records() {
        let mut s = session(100, 100, false);
        assert_eq!(s.history().len(), 1);
        stroke(&mut s, &TRIANGLE);

        assert_eq!(s.region(), &expected(s.size(), &TRIANGLE));
        assert!(s.region().contains(30, 20));
        assert_eq!(s.history().len(), 2);
        assert!(s.can_undo());
        assert!(!s.can_redo());
    }

    #[test]
    fn undo_returns_to_empty() {
        let mut s = session(100, 100, false);
        stroke(&mut s, &TRIANGLE);
        assert!(s.undo());
        assert!(s.region().is_empty());
        assert!(!s.can_undo());
        assert!(s.can_redo());
        assert!(!s.undo());
    }

    #[test]
    fn new_stroke_after_undo_discards_branch() {
        let mut s = session(100, 100, false);
        stroke(&mut s, &TRIANGLE);
        s.undo();
        let other = [(60.0, 60.0), (90.0, 60.0), (90.0, 90.0), (60.0, 90.0)];
        stroke(&mut s, &other);

        assert_eq!(s.history().len(), 2);
        assert!(!s.can_redo());
        assert!(!s.redo());
        assert_eq!(s.region(), &expected(s.size(), &other));
        assert!(!s.region().contains(30, 20));
    }

    #[test]
    fn redo_restores_region_before_undo() {
        let mut s = session(100, 100, false);
        stroke(&mut s, &TRIANGLE);
        stroke(&mut s, &[(60.0, 60.0), (90.0, 60.0), (75.0, 90.0)]);
        let before = s.region().clone();
        s.undo();
        assert_ne!(s.region(), &before);
        assert!(s.redo());
        assert_eq!(s.region(), &before);
    }

    #[test]
    fn tap_changes_nothing() {
        let mut s = session(100, 100, false);
        stroke(&mut s, &[(10.0, 10.0), (12.0, 12.0)]);
        assert!(s.region().is_empty());
        assert_eq!(s.history().len(), 1);
        assert!(!s.can_undo());
    }

    #[test]
    fn erase_removes_drawn_area() {
        let mut s = session(100, 100, false);
        stroke(&mut s, &[(10.0, 10.0), (50.0, 10.0), (50.0, 50.0), (10.0, 50.0)]);
        s.set_mode(Mode::Erase);
        stroke(&mut s, &[(30.0, 0.0), (99.0, 0.0), (99.0, 99.0), (30.0, 99.0)]);
        assert_eq!(s.region().covered_count(), 20 * 40);
        assert!(s.region().contains(20, 20));
        assert!(!s.region().contains(40, 20));
        assert_eq!(s.history().len(), 3);
    }

    #[test]
    fn magnetic_snap_pulls_close_points_only() {
        let mut s = session(400, 400, true);
        s.set_magnetic_threshold(20);
        // Topmost edge pixel: nothing else can be as close from straight above.
        let top = s.edges().points()[0];

        s.on_pointer_down(Point::new(0.0, 0.0));
        s.on_pointer_move(Point::new(top.x, top.y - 5.0));
        assert_eq!(s.stroke_cursor(), Some(top));

        let far = Point::new(top.x, top.y - 25.0);
        s.on_pointer_move(far);
        assert_eq!(s.stroke_cursor(), Some(far));
    }

    #[test]
    fn magnetic_toggle_off_keeps_raw_points() {
        let mut s = session(400, 400, true);
        s.toggle_magnetic_snap();
        assert!(!s.magnetic_snap());
        let top = s.edges().points()[0];
        let near = Point::new(top.x, top.y - 5.0);
        s.on_pointer_down(Point::new(0.0, 0.0));
        s.on_pointer_move(near);
        assert_eq!(s.stroke_cursor(), Some(near));
    }

    #[test]
    fn negative_threshold_clamps_to_zero() {
        let mut s = session(100, 100, true);
        s.set_magnetic_threshold(-4);
        assert_eq!(s.magnetic_threshold(), 0);
    }

    #[test]
    fn reentrant_pointer_down_is_ignored() {
        let mut s = session(100, 100, false);
        s.on_pointer_down(Point::new(10.0, 10.0));
        s.on_pointer_move(Point::new(50.0, 10.0));
        s.on_pointer_down(Point::new(80.0, 80.0));
        s.on_pointer_move(Point::new(30.0, 40.0));
        s.on_pointer_up();
        assert_eq!(s.region(), &expected(s.size(), &TRIANGLE));
    }

    #[test]
    fn pointer_leave_commits_like_release() {
        let mut s = session(100, 100, false);
        s.on_pointer_down(Point::new(10.0, 10.0));
        s.on_pointer_move(Point::new(50.0, 10.0));
        s.on_pointer_move(Point::new(30.0, 40.0));
        s.on_pointer_leave();
        assert!(!s.is_capturing());
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn reset_mid_stroke_abandons_and_regenerates() {
        let mut s = session(300, 300, false);
        stroke(&mut s, &TRIANGLE);
        let old_blob = s.blob().clone();
        s.on_pointer_down(Point::new(5.0, 5.0));
        s.on_pointer_move(Point::new(60.0, 5.0));

        s.reset_session();
        assert!(!s.is_capturing());
        assert!(s.region().is_empty());
        assert_eq!(s.history().len(), 1);
        assert!(!s.can_undo());
        assert_ne!(s.blob(), &old_blob);
        assert!(!s.edges().is_empty());

        // The abandoned stroke must not commit on a late release.
        s.on_pointer_up();
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn clear_annotations_keeps_blob() {
        let mut s = session(300, 300, false);
        stroke(&mut s, &TRIANGLE);
        let blob = s.blob().clone();
        s.clear_annotations();
        assert!(s.region().is_empty());
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.blob(), &blob);
    }

    #[test]
    fn resize_preserves_region_and_blob() {
        let mut s = session(200, 200, false);
        stroke(&mut s, &TRIANGLE);
        let covered = s.region().covered_count();
        let blob = s.blob().clone();

        s.resize(SurfaceSize::new(320, 240));
        assert_eq!(s.size(), SurfaceSize::new(320, 240));
        assert_eq!(s.region().covered_count(), covered);
        assert_eq!(s.blob(), &blob);
        assert!(!s.edges().is_empty());
    }

    #[test]
    fn zero_resize_is_deferred() {
        let mut s = session(200, 200, false);
        stroke(&mut s, &TRIANGLE);
        let region = s.region().clone();
        s.resize(SurfaceSize::new(0, 150));
        s.resize(SurfaceSize::new(150, 0));
        assert_eq!(s.size(), SurfaceSize::new(200, 200));
        assert_eq!(s.region(), &region);
    }

    #[test]
    fn undo_after_shrink_restores_whole_snapshot() {
        let mut s = session(200, 200, false);
        stroke(&mut s, &TRIANGLE);
        stroke(&mut s, &[(100.0, 100.0), (150.0, 100.0), (120.0, 150.0)]);
        s.resize(SurfaceSize::new(120, 120));
        assert!(s.undo());
        assert_eq!(s.region(), &expected(SurfaceSize::new(200, 200), &TRIANGLE));
    }

    #[test]
    fn shrink_and_grow_back_keeps_region_in_step_with_history() {
        let mut s = session(200, 200, false);
        stroke(&mut s, &TRIANGLE);
        let before = s.region().clone();

        s.resize(SurfaceSize::new(20, 20));
        s.resize(SurfaceSize::new(200, 200));
        assert_eq!(s.region().covered_count(), before.covered_count());
        assert_eq!(s.region(), &before);

        assert!(s.undo());
        assert!(s.redo());
        assert_eq!(s.region(), &before);
    }

    #[test]
    fn shrunk_frame_only_shows_visible_part() {
        let mut s = session(200, 200, false);
        stroke(&mut s, &TRIANGLE);
        let fb = s.render_frame(SurfaceSize::new(20, 20));
        assert_eq!((fb.width, fb.height), (20, 20));
        assert_eq!(s.region(), &expected(SurfaceSize::new(200, 200), &TRIANGLE));
    }

    #[test]
    fn render_frame_follows_requested_size_and_shows_preview() {
        let mut s = session(120, 90, false);
        let fb = s.render_frame(SurfaceSize::new(160, 100));
        assert_eq!((fb.width, fb.height), (160, 100));

        s.on_pointer_down(Point::new(5.0, 5.0));
        s.on_pointer_move(Point::new(40.0, 5.0));
        let fb = s.render_frame(SurfaceSize::new(160, 100));
        assert_eq!(fb.get(20, 5), Some(render::PREVIEW_COLOR));
    }

    #[test]
    fn preview_toward_far_off_pointer_renders_clipped() {
        let mut s = session(100, 100, false);
        s.on_pointer_down(Point::new(10.0, 10.0));
        s.on_pointer_move(Point::new(3.0e9, 10.0));
        let fb = s.render_frame(SurfaceSize::new(100, 100));
        assert_eq!(fb.get(50, 10), Some(render::PREVIEW_COLOR));
        assert_eq!(fb.get(99, 10), Some(render::PREVIEW_COLOR));
    }

    #[test]
    fn render_frame_with_zero_size_keeps_last_surface() {
        let mut s = session(120, 90, false);
        let fb = s.render_frame(SurfaceSize::new(0, 0));
        assert_eq!((fb.width, fb.height), (120, 90));
    }
}
