//! Error types for sketch operations.

use thiserror::Error;

use crate::SurfaceId;

/// Result type for sketch operations.
pub type SketchResult<T> = Result<T, SketchError>;

/// Errors that can occur in sketch operations.
///
/// Gesture handling never produces these: a missing surface or handle during
/// a gesture is an ordinary precondition and is ignored by the router.
#[derive(Debug, Error)]
pub enum SketchError {
    /// Surface not found in the scene table.
    #[error("Surface not found: {0}")]
    SurfaceNotFound(SurfaceId),

    /// A surface already occupies the scene.
    #[error("A surface is already placed: {0}")]
    SurfaceExists(SurfaceId),

    /// Invalid surface dimensions.
    #[error("Invalid surface extent: {width}x{height}")]
    InvalidExtent {
        /// Requested width in meters.
        width: f32,
        /// Requested height in meters.
        height: f32,
    },

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
