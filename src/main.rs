// What you SEE now:
// • A reddish blob in the middle of the window (the reference shape).
// • Hold Left Mouse and drag to outline an area; release to fill it in blue.
// • D / E switch between draw and erase. M toggles the magnetic lasso,
//   [ and ] shrink/grow its reach. Z undo, Y redo.
// • N starts a new patient (new blob), R clears the drawing. ESC quits.

use lasso_annotator::config::Settings;
use lasso_annotator::draw::{Drawer, draw_text_5x7};
use lasso_annotator::magnifier::Magnifier;
use lasso_annotator::render;
use lasso_annotator::rng::Rng32;
use lasso_annotator::{AnnotationSession, Error, FrameBuffer, Mode, Point, SurfaceSize};
use minifb::Key;
use tracing::info;
use tracing_subscriber::EnvFilter;

const THRESHOLD_STEP: i32 = 5;
const HUD_COLOR: u32 = 0x00_20_20_20;
const HUD_SHADOW: u32 = 0x00_DD_DD_DD;

fn setup_logging() {
    // RUST_LOG wins; otherwise info overall, debug for this crate.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lasso_annotator=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn main() -> Result<(), Error> {
    setup_logging();

    /* --- Settings + window ---
       Visual: an empty window opens at the configured size. */
    let settings = Settings::load_or_default(&Settings::path_from_args(std::env::args()));
    let mut drawer = Drawer::new(
        "Lasso Annotator",
        settings.window_width,
        settings.window_height,
        settings.target_fps,
    )?;

    /* --- Session ---
       Visual: the blob appears; the annotation region starts empty. */
    let rng = match settings.seed {
        Some(seed) => Rng32::from_seed(seed),
        None => Rng32::from_clock(),
    };
    let initial = drawer.size();
    let size = if initial.is_drawable() {
        initial
    } else {
        SurfaceSize::new(settings.window_width, settings.window_height)
    };
    let mut session = AnnotationSession::new(size, settings.snap(), rng);
    let mut magnifier = Magnifier::new(settings.magnifier());

    /* --- Reusable screen buffer --- */
    let mut screen = FrameBuffer::new(size.width, size.height);

    let mut was_down = false;
    let mut last_pointer: Option<Point> = None;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Follow window resizes (zero sizes are ignored by the session). */
        session.resize(drawer.size());

        /* 2) Buttons */
        if drawer.pressed_once(Key::D) { session.set_mode(Mode::Draw); }
        if drawer.pressed_once(Key::E) { session.set_mode(Mode::Erase); }
        if drawer.pressed_once(Key::M) { session.toggle_magnetic_snap(); }
        if drawer.pressed_once(Key::LeftBracket) {
            session.set_magnetic_threshold(session.magnetic_threshold() as i32 - THRESHOLD_STEP);
        }
        if drawer.pressed_once(Key::RightBracket) {
            session.set_magnetic_threshold(session.magnetic_threshold() as i32 + THRESHOLD_STEP);
        }
        if drawer.pressed_once(Key::Z) { session.undo(); }
        if drawer.pressed_once(Key::Y) { session.redo(); }
        if drawer.pressed_once(Key::N) {
            info!("New patient requested");
            session.reset_session();
        }
        if drawer.pressed_once(Key::R) {
            info!("Reset drawing requested");
            session.clear_annotations();
        }

        /* 3) Pointer: press starts a stroke, movement extends it, release or
              leaving the window ends it. Coming back while still held does
              not restart it (moves while idle are ignored). */
        let down = drawer.left_mouse_down();
        let pointer = drawer.pointer();
        match (was_down, down, pointer) {
            (false, true, Some(at)) => session.on_pointer_down(at),
            (true, true, Some(at)) if Some(at) != last_pointer => session.on_pointer_move(at),
            (true, true, None) => session.on_pointer_leave(),
            (true, false, _) => session.on_pointer_up(),
            _ => {}
        }
        was_down = down;
        last_pointer = pointer;

        /* 4) Scene, then the loupe while drawing, then the HUD on top. */
        session.render_into(&mut screen);
        if let Some(at) = session.stroke_cursor() {
            magnifier.draw(&mut screen, at, render::accent(session.mode()));
        }
        let hud = format!(
            "{} | MAGNET {} {} | UNDO {} REDO {} | N NEW  R RESET",
            match session.mode() { Mode::Draw => "DRAW", Mode::Erase => "ERASE" },
            if session.magnetic_snap() { "ON" } else { "OFF" },
            session.magnetic_threshold(),
            if session.can_undo() { "Z" } else { "-" },
            if session.can_redo() { "Y" } else { "-" },
        );
        draw_text_5x7(&mut screen, 8, 8, &hud, HUD_COLOR, HUD_SHADOW);

        /* 5) Present to the window. */
        drawer.present(&screen)?;
    }

    Ok(())
}
