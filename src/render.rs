// Frame composition: background, reference blob, annotation region, live stroke.

use image::GrayImage;

use crate::draw::{blend, draw_thick_line};
use crate::raster::CLEAR;
use crate::region::Region;
use crate::types::{FrameBuffer, Mode, Polyline};

pub const BACKGROUND: u32 = 0x00_FF_FF_FF;
/// rgba(200, 100, 100, 0.6)
pub const SHAPE_COLOR: u32 = 0x00_C8_64_64;
pub const SHAPE_ALPHA: f32 = 0.6;
/// rgba(0, 100, 255, 0.3)
pub const REGION_COLOR: u32 = 0x00_00_64_FF;
pub const REGION_ALPHA: f32 = 0.3;
pub const PREVIEW_COLOR: u32 = 0x00_00_00_00;
pub const PREVIEW_WIDTH: i32 = 2;
pub const DRAW_ACCENT: u32 = 0x00_21_96_F3;
pub const ERASE_ACCENT: u32 = 0x00_F4_43_36;

/// Color that marks the active mode (magnifier ring, HUD).
pub fn accent(mode: Mode) -> u32 {
    match mode {
        Mode::Draw => DRAW_ACCENT,
        Mode::Erase => ERASE_ACCENT,
    }
}

/// Tint every covered mask pixel. Mask and frame are anchored at the
/// top-left; whatever lies outside either one is skipped.
pub fn fill_mask(fb: &mut FrameBuffer, mask: &GrayImage, color: u32, alpha: f32) {
    let w = fb.width.min(mask.width() as usize);
    let h = fb.height.min(mask.height() as usize);
    for y in 0..h {
        let row = y * fb.width;
        for x in 0..w {
            if mask.get_pixel(x as u32, y as u32).0[0] > CLEAR {
                fb.pixels[row + x] = blend(fb.pixels[row + x], color, alpha);
            }
        }
    }
}

/// Open polyline as a stroked (not filled) line.
pub fn stroke_polyline(fb: &mut FrameBuffer, line: &Polyline) {
    for pair in line.points().windows(2) {
        draw_thick_line(fb, pair[0], pair[1], PREVIEW_WIDTH, PREVIEW_COLOR);
    }
    if let [only] = line.points() {
        draw_thick_line(fb, *only, *only, PREVIEW_WIDTH, PREVIEW_COLOR);
    }
}

/// Full scene into `fb`, which must already have the canvas size.
pub fn render_scene(fb: &mut FrameBuffer, shape: &GrayImage, region: &Region, preview: Option<&Polyline>) {
    fb.pixels.fill(BACKGROUND);
    fill_mask(fb, shape, SHAPE_COLOR, SHAPE_ALPHA);
    fill_mask(fb, region.mask(), REGION_COLOR, REGION_ALPHA);
    if let Some(line) = preview {
        stroke_polyline(fb, line);
    }
}
