//! Errors raised by the interaction session and the replay driver.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while driving a sketch session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Scene bookkeeping failed.
    #[error("scene error: {0}")]
    Sketch(#[from] sketch_core::SketchError),

    /// Canvas allocation or snapshot encoding failed.
    #[error("render error: {0}")]
    Render(#[from] sketch_renderer::RenderError),

    /// The description client could not be set up.
    #[error("description service: {0}")]
    Description(#[from] sketch_vision::DescriptionError),

    /// No description service is configured.
    #[error("no description service configured")]
    DescriberUnavailable,

    /// There is no canvas to snapshot.
    #[error("nothing to describe: no canvas")]
    NoCanvas,

    /// Description requests need a tokio runtime.
    #[error("no async runtime available for description requests")]
    NoRuntime,

    /// Reading a script or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A replay script could not be parsed.
    #[error("invalid replay script: {0}")]
    Script(#[from] serde_json::Error),
}
