// Freehand region annotation over a generated reference blob.
//
// The core is session::AnnotationSession: strokes are captured from
// pointer events (optionally pulled onto the blob's boundary by the magnetic
// snap), unioned into or subtracted from a raster region::Region, and
// recorded in a linear undo/redo history::History. The window shell in
// `main.rs` only forwards input and presents frames.

pub mod config;
pub mod draw;
pub mod edges;
pub mod error;
pub mod history;
pub mod magnifier;
pub mod raster;
pub mod region;
pub mod render;
pub mod rng;
pub mod session;
pub mod shape;
pub mod stroke;
pub mod types;

pub use error::Error;
pub use session::AnnotationSession;
pub use types::{FrameBuffer, Mode, Point, SurfaceSize};
