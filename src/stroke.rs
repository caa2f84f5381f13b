// Pointer movement to stroke polyline, with the magnetic edge snap.

use tracing::trace;

use crate::edges::EdgeIndex;
use crate::types::{Point, Polygon, Polyline};

pub const DEFAULT_MAGNETIC_THRESHOLD: u32 = 20;

/// Magnetic snap tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapSettings {
    pub enabled: bool,
    /// Max pixel distance a point may be pulled.
    pub threshold: u32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self { enabled: true, threshold: DEFAULT_MAGNETIC_THRESHOLD }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum StrokeState {
    #[default]
    Idle,
    Capturing(Polyline),
}

/// One stroke at a time: pointer-down while capturing is ignored.
#[derive(Clone, Debug, Default)]
pub struct StrokeCapture {
    state: StrokeState,
    pub snap: SnapSettings,
}

impl StrokeCapture {
    pub fn new(snap: SnapSettings) -> Self {
        Self { state: StrokeState::Idle, snap }
    }

    pub fn state(&self) -> &StrokeState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, StrokeState::Capturing(_))
    }

    /// Start a stroke at the raw pointer position. Returns `false` (and
    /// changes nothing) if a stroke is already in progress.
    pub fn begin(&mut self, start: Point) -> bool {
        if self.is_capturing() {
            trace!(?start, "pointer-down during capture ignored");
            return false;
        }
        self.state = StrokeState::Capturing(Polyline::starting_at(start));
        true
    }

    /// Append a point, snapped when enabled and an edge is in reach.
    /// Returns the point actually appended, `None` while idle.
    pub fn extend(&mut self, raw: Point, edges: &EdgeIndex) -> Option<Point> {
        let snap = self.snap;
        let StrokeState::Capturing(line) = &mut self.state else {
            return None;
        };
        let point = if snap.enabled {
            edges.nearest(raw, snap.threshold as f32).unwrap_or(raw)
        } else {
            raw
        };
        line.push(point);
        Some(point)
    }

    /// End the stroke. Too-short strokes are dropped and yield `None`.
    pub fn finish(&mut self) -> Option<Polygon> {
        match std::mem::take(&mut self.state) {
            StrokeState::Idle => None,
            StrokeState::Capturing(line) => {
                let points = line.len();
                let polygon = line.close();
                if polygon.is_none() {
                    trace!(points, "stroke too short, discarded");
                }
                polygon
            }
        }
    }

    /// Drop any stroke in progress without committing it.
    pub fn abandon(&mut self) {
        self.state = StrokeState::Idle;
    }

    /// Open polyline for the live preview.
    pub fn preview(&self) -> Option<&Polyline> {
        match &self.state {
            StrokeState::Capturing(line) => Some(line),
            StrokeState::Idle => None,
        }
    }

    /// Most recent point of the stroke in progress.
    pub fn cursor(&self) -> Option<Point> {
        self.preview().and_then(|line| line.points().last().copied())
    }
}
