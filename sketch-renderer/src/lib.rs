//! # Sketch Surface Renderer
//!
//! Raster side of the drawing surface: a fixed-size canvas that smoothed
//! strokes are composited onto, and the snapshot encodings handed to the
//! AR host and the description service.
//!
//! ```text
//! StrokeSegment ──► CanvasImage (tiny-skia) ──► PNG  ─► surface material
//!                                          └──► JPEG ─► description request
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod error;
pub mod export;

pub use canvas::{CanvasImage, DEFAULT_CANVAS_SIZE};
pub use error::{RenderError, RenderResult};
pub use export::{SnapshotFormat, DEFAULT_JPEG_QUALITY};
