//! # Sketch Surface Core
//!
//! Drawing-surface logic for freehand sketching on AR-anchored planes,
//! independent of any rendering toolkit.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 sketch-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Gesture Router  │  Scene Table             │
//! │  - Mode state    │  - Surfaces              │
//! │  - Input channels│  - Plane/handle objects  │
//! ├─────────────────────────────────────────────┤
//! │  Stroke Smoother │  Surface Geometry        │
//! │  - Midpoint Béz. │  - Edge handles          │
//! │  - Grid snapping │  - Resize / rotate       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rasterization lives behind [`StrokeTarget`] and AR tracking behind
//! [`SceneHost`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod error;
pub mod event;
pub mod geometry;
pub mod host;
pub mod router;
pub mod scene;
pub mod smoother;
pub mod state;

pub use color::{BackgroundColor, PenColor, Rgba};
pub use error::{SketchError, SketchResult};
pub use event::{GesturePhase, InputChannel, PointerEvent};
pub use geometry::{HandleId, ResizeTracker, SurfaceGeometry};
pub use host::{CameraPose, HitFilter, PlaneAnchor, SceneHit, SceneHost};
pub use router::{GestureRouter, GestureStage, RouteOutcome};
pub use scene::{AnchorId, ObjectId, Scene, Surface, SurfaceId};
pub use smoother::{StrokeSegment, StrokeSmoother, StrokeStyle, StrokeTarget};
pub use state::{ControlState, InteractionMode, ModeState, ModeToggle};

/// Sketch core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
