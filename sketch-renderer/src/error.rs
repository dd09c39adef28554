//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rasterizing or encoding a canvas.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The pixel buffer could not be allocated (zero or oversized dimensions).
    #[error("Failed to allocate {width}x{height} canvas")]
    Allocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Encoding a snapshot failed.
    #[error("Snapshot encoding failed: {0}")]
    Encode(String),
}
