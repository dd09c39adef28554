//! Streaming stroke smoothing.
//!
//! Raw pointer samples are turned into quadratic Bézier segments whose
//! control point is the midpoint of the last two samples. Only the previous
//! sample is retained, so memory is constant for strokes of any length.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Grid spacing used by snap-to-grid, in canvas pixels.
pub const DEFAULT_GRID_SIZE: f32 = 32.0;

/// Pen width in canvas pixels.
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

/// One quadratic segment of a smoothed stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    /// Start point (the previous sample).
    pub from: Vec2,
    /// End point (the current sample).
    pub to: Vec2,
    /// Quadratic control point.
    pub control: Vec2,
}

/// How a segment is painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Ink color.
    pub color: Rgba,
    /// Line width in canvas pixels. Caps and joins are round.
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// A raster that smoothed segments can be painted onto.
pub trait StrokeTarget {
    /// Canvas size in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Composite one segment onto the raster.
    fn paint_segment(&mut self, segment: &StrokeSegment, style: &StrokeStyle);
}

/// Midpoint smoother for a single stroke.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeSmoother {
    last_point: Option<Vec2>,
}

impl StrokeSmoother {
    /// Create an idle smoother.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke at `point`. Nothing is painted yet.
    pub fn begin(&mut self, point: Vec2) {
        self.last_point = Some(point);
    }

    /// Advance the stroke to `point`.
    ///
    /// Returns `None` if no stroke was begun.
    pub fn extend(&mut self, point: Vec2) -> Option<StrokeSegment> {
        let last = self.last_point?;
        self.last_point = Some(point);
        Some(StrokeSegment {
            from: last,
            to: point,
            control: (last + point) * 0.5,
        })
    }

    /// Finish the stroke.
    pub fn end(&mut self) {
        self.last_point = None;
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.last_point.is_some()
    }

    /// Last sample of the current stroke.
    #[must_use]
    pub fn last_point(&self) -> Option<Vec2> {
        self.last_point
    }
}

/// Round each coordinate to the nearest multiple of `grid`.
#[must_use]
pub fn snap_to_grid(point: Vec2, grid: f32) -> Vec2 {
    if grid <= 0.0 {
        return point;
    }
    (point / grid).round() * grid
}

/// Map texture coordinates (v up) onto canvas pixels (y down).
#[must_use]
#[allow(clippy::cast_precision_loss)] // canvas dimensions are small
pub fn uv_to_canvas(uv: Vec2, size: (u32, u32)) -> Vec2 {
    Vec2::new(uv.x * size.0 as f32, (1.0 - uv.y) * size.1 as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_without_begin_paints_nothing() {
        let mut smoother = StrokeSmoother::new();
        assert!(smoother.extend(Vec2::new(1.0, 1.0)).is_none());
        assert!(!smoother.is_active());
    }

    #[test]
    fn test_two_segment_scenario() {
        let mut smoother = StrokeSmoother::new();
        smoother.begin(Vec2::new(10.0, 10.0));

        let first = smoother.extend(Vec2::new(20.0, 10.0)).expect("first segment");
        assert_eq!(first.from, Vec2::new(10.0, 10.0));
        assert_eq!(first.to, Vec2::new(20.0, 10.0));
        assert_eq!(first.control, Vec2::new(15.0, 10.0));

        let second = smoother.extend(Vec2::new(20.0, 20.0)).expect("second segment");
        assert_eq!(second.from, first.to);
        assert_eq!(second.to, Vec2::new(20.0, 20.0));
        assert_eq!(second.control, Vec2::new(20.0, 15.0));
    }

    #[test]
    fn test_end_clears_stroke() {
        let mut smoother = StrokeSmoother::new();
        smoother.begin(Vec2::ZERO);
        smoother.end();
        assert!(smoother.last_point().is_none());
        assert!(smoother.extend(Vec2::ONE).is_none());
    }

    #[test]
    fn test_snap_rounds_to_nearest() {
        assert_eq!(snap_to_grid(Vec2::new(45.0, 13.0), 32.0), Vec2::new(32.0, 0.0));
        assert_eq!(snap_to_grid(Vec2::new(48.0, 17.0), 32.0), Vec2::new(64.0, 32.0));
        assert_eq!(snap_to_grid(Vec2::new(5.5, 7.0), 0.0), Vec2::new(5.5, 7.0));
    }

    #[test]
    fn test_uv_mapping_flips_v() {
        let p = uv_to_canvas(Vec2::new(0.25, 0.75), (512, 512));
        assert_eq!(p, Vec2::new(128.0, 128.0));
        let corner = uv_to_canvas(Vec2::new(0.0, 0.0), (512, 256));
        assert_eq!(corner, Vec2::new(0.0, 256.0));
    }
}
