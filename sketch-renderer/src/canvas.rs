//! The drawable raster of a surface.

use sketch_core::{Rgba, StrokeSegment, StrokeStyle, StrokeTarget};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::export::{self, SnapshotFormat};

/// Side length of a freshly created canvas, in pixels.
pub const DEFAULT_CANVAS_SIZE: u32 = 512;

/// A fixed-size RGBA raster that smoothed strokes are composited onto.
///
/// The buffer is allocated once; painting and clearing never change its
/// dimensions.
#[derive(Debug, Clone)]
pub struct CanvasImage {
    pixmap: Pixmap,
    background: Rgba,
}

impl CanvasImage {
    /// Allocate a canvas filled with `background`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Allocation`] for zero or oversized dimensions.
    pub fn new(width: u32, height: u32, background: Rgba) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        let mut canvas = Self { pixmap, background };
        canvas.clear(background);
        Ok(canvas)
    }

    /// Allocate a square canvas.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Allocation`] for zero or oversized dimensions.
    pub fn square(size: u32, background: Rgba) -> RenderResult<Self> {
        Self::new(size, size, background)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Color the canvas was last filled with.
    #[must_use]
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Fill every pixel with `background`.
    pub fn clear(&mut self, background: Rgba) {
        self.background = background;
        self.pixmap
            .fill(Color::from_rgba8(background.r, background.g, background.b, background.a));
    }

    /// Composite a quadratic segment from `from` through `control` to `to`.
    ///
    /// Strokes are anti-aliased with round caps and joins, so consecutive
    /// segments sharing an endpoint join without seams.
    pub fn paint_smooth_segment(&mut self, segment: &StrokeSegment, style: &StrokeStyle) {
        let mut paint = Paint::default();
        let c = style.color;
        paint.set_color_rgba8(c.r, c.g, c.b, c.a);
        paint.anti_alias = true;

        if segment.from == segment.to && segment.control == segment.to {
            // A round cap on a zero-length segment is a dot.
            if let Some(dot) =
                PathBuilder::from_circle(segment.to.x, segment.to.y, style.width / 2.0)
            {
                self.pixmap
                    .fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
            }
            return;
        }

        let mut builder = PathBuilder::new();
        builder.move_to(segment.from.x, segment.from.y);
        builder.quad_to(segment.control.x, segment.control.y, segment.to.x, segment.to.y);
        let Some(path) = builder.finish() else {
            tracing::debug!("Skipping unrenderable segment {segment:?}");
            return;
        };

        let stroke = Stroke {
            width: style.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Color of one pixel, or `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba {
            r: color.red(),
            g: color.green(),
            b: color.blue(),
            a: color.alpha(),
        })
    }

    /// Lossless PNG encoding of the current pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn snapshot(&self) -> RenderResult<Vec<u8>> {
        export::encode_png(&self.pixmap)
    }

    /// JPEG encoding of the current pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn snapshot_jpeg(&self, quality: u8) -> RenderResult<Vec<u8>> {
        export::encode_jpeg(&self.pixmap, self.background.to_array(), quality)
    }

    /// Encode the current pixels in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn snapshot_as(&self, format: SnapshotFormat, jpeg_quality: u8) -> RenderResult<Vec<u8>> {
        export::encode(&self.pixmap, format, self.background.to_array(), jpeg_quality)
    }
}

impl StrokeTarget for CanvasImage {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn paint_segment(&mut self, segment: &StrokeSegment, style: &StrokeStyle) {
        self.paint_smooth_segment(segment, style);
    }
}
