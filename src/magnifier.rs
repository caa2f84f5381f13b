// Circular loupe drawn above the pointer while a stroke is in progress.
// It samples the already-rendered frame, so it shows exactly what is on screen.

use crate::draw::{blend_line, put_pixel};
use crate::types::{FrameBuffer, Point};

const LOUPE_BACKGROUND: u32 = 0x00_FF_FF_FF;
const RING_WIDTH: f32 = 3.0;
/// rgba(0, 0, 0, 0.2)
const CROSSHAIR_COLOR: u32 = 0x00_00_00_00;
const CROSSHAIR_ALPHA: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MagnifierSettings {
    /// Diameter in pixels.
    pub size: usize,
    pub zoom: f32,
    /// Gap between the pointer and the loupe's bottom edge.
    pub lift: i32,
}

impl Default for MagnifierSettings {
    fn default() -> Self {
        Self { size: 100, zoom: 2.5, lift: 30 }
    }
}

pub struct Magnifier {
    settings: MagnifierSettings,
    source: Vec<u32>, // copy of the frame before the loupe is drawn over it
}

impl Magnifier {
    pub fn new(settings: MagnifierSettings) -> Self {
        Self { settings, source: Vec::new() }
    }

    /// Top-left corner of the loupe for a pointer at `at`.
    pub fn origin(&self, at: Point) -> (i32, i32) {
        let half = (self.settings.size / 2) as i32;
        let rise = (self.settings.size as i32).saturating_add(self.settings.lift);
        (
            (at.x.floor() as i32).saturating_sub(half),
            (at.y.floor() as i32).saturating_sub(rise),
        )
    }

    /// Draw the loupe into `fb`, magnifying the area around `at`.
    pub fn draw(&mut self, fb: &mut FrameBuffer, at: Point, ring_color: u32) {
        let size = self.settings.size;
        if size == 0 || fb.pixels.is_empty() {
            return;
        }
        self.source.clear();
        self.source.extend_from_slice(&fb.pixels);

        let (ox, oy) = self.origin(at);
        let extent = size as i64;
        let (fw, fh) = (fb.width as i64, fb.height as i64);
        if i64::from(ox) + extent <= 0 || i64::from(oy) + extent <= 0 || i64::from(ox) >= fw || i64::from(oy) >= fh {
            return;
        }
        let radius = size as f32 / 2.0;
        let ring_mid = radius - 2.0;
        let zoom = self.settings.zoom.max(f32::EPSILON);

        for my in 0..size {
            for mx in 0..size {
                let dx = mx as f32 + 0.5 - radius;
                let dy = my as f32 + 0.5 - radius;
                let d = (dx * dx + dy * dy).sqrt();
                if d > radius {
                    continue;
                }
                let (px, py) = (ox + mx as i32, oy + my as i32);
                if (d - ring_mid).abs() <= RING_WIDTH / 2.0 {
                    put_pixel(fb, px, py, ring_color);
                    continue;
                }
                let sx = (at.x + dx / zoom).floor();
                let sy = (at.y + dy / zoom).floor();
                let color = self.sample(fb.width, fb.height, sx, sy);
                put_pixel(fb, px, py, color);
            }
        }

        // Crosshair inside the ring; the horizontal arms skip the center the
        // vertical one already darkened.
        let c = radius as i32;
        let inner = (ring_mid - RING_WIDTH / 2.0).floor() as i32;
        blend_line(fb, ox + c, oy + c - inner, ox + c, oy + c + inner, CROSSHAIR_COLOR, CROSSHAIR_ALPHA);
        blend_line(fb, ox + c - inner, oy + c, ox + c - 1, oy + c, CROSSHAIR_COLOR, CROSSHAIR_ALPHA);
        blend_line(fb, ox + c + 1, oy + c, ox + c + inner, oy + c, CROSSHAIR_COLOR, CROSSHAIR_ALPHA);
    }

    fn sample(&self, width: usize, height: usize, x: f32, y: f32) -> u32 {
        if x < 0.0 || y < 0.0 {
            return LOUPE_BACKGROUND;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= width || y >= height {
            return LOUPE_BACKGROUND;
        }
        self.source[y * width + x]
    }
}
