//! Drawable surface geometry and its edge-resize/rotate manipulator.
//!
//! A surface is a rectangle in its own local frame: x to the right, y up,
//! z out of the drawing face. Four edge handles sit at the midpoints of the
//! edges, nudged along z so they never z-fight with the surface.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{ObjectId, SurfaceId};
use crate::{SketchError, SketchResult};

/// Smallest width or height a resize can produce, in meters.
pub const MIN_EXTENT: f32 = 0.1;

/// Distance handles float in front of the surface, in meters.
pub const HANDLE_Z_OFFSET: f32 = 0.01;

/// Radius of the handle spheres, in meters.
pub const HANDLE_RADIUS: f32 = 0.015 * 0.75;

/// Corner rounding of the surface, in meters.
pub const CORNER_RADIUS: f32 = 0.05;

/// Screen points of drag per radian of rotation.
pub const ROTATION_SENSITIVITY: f32 = 300.0;

/// Width of a freshly spawned surface, in meters.
pub const DEFAULT_WIDTH: f32 = 0.75;

/// Height of a freshly spawned surface, in meters.
pub const DEFAULT_HEIGHT: f32 = 0.5;

/// One of the four edge handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleId {
    /// Midpoint of the top edge.
    Top,
    /// Midpoint of the bottom edge.
    Bottom,
    /// Midpoint of the left edge.
    Left,
    /// Midpoint of the right edge.
    Right,
}

impl HandleId {
    /// All handles in a fixed order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// Scene name of the handle object.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Top => "topEdge",
            Self::Bottom => "bottomEdge",
            Self::Left => "leftEdge",
            Self::Right => "rightEdge",
        }
    }

    /// Look up a handle by its scene name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    /// Top and bottom handles resize the height.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Size and pose of a drawable surface.
///
/// Handle offsets are derived from the extent and refreshed by every
/// mutator, so they always sit on the edges of the current rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    width: f32,
    height: f32,
    /// World-space center of the surface.
    pub position: Vec3,
    /// Euler angles in radians: pitch (x), yaw (y), roll (z).
    pub orientation: Vec3,
    handles: [Vec3; 4],
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self::from_extent(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl SurfaceGeometry {
    /// Create a surface of the given extent at the world origin.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidExtent`] unless both dimensions are
    /// finite and positive.
    pub fn new(width: f32, height: f32) -> SketchResult<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(SketchError::InvalidExtent { width, height });
        }
        Ok(Self::from_extent(width, height))
    }

    fn from_extent(width: f32, height: f32) -> Self {
        let mut geometry = Self {
            width,
            height,
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            handles: [Vec3::ZERO; 4],
        };
        geometry.recompute_handles();
        geometry
    }

    /// Place the surface in the world.
    #[must_use]
    pub fn with_pose(mut self, position: Vec3, orientation: Vec3) -> Self {
        self.position = position;
        self.orientation = orientation;
        self
    }

    /// Width in meters.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height in meters.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Local-space offset of a handle from the surface center.
    #[must_use]
    pub fn handle_offset(&self, handle: HandleId) -> Vec3 {
        self.handles[handle.index()]
    }

    /// All handles with their local-space offsets.
    pub fn handles(&self) -> impl Iterator<Item = (HandleId, Vec3)> + '_ {
        HandleId::ALL.into_iter().map(|h| (h, self.handle_offset(h)))
    }

    /// Set both dimensions, clamped to [`MIN_EXTENT`].
    pub fn set_extent(&mut self, width: f32, height: f32) {
        self.width = clamp_extent(width);
        self.height = clamp_extent(height);
        self.recompute_handles();
    }

    fn recompute_handles(&mut self) {
        let w = self.width / 2.0;
        let h = self.height / 2.0;
        self.handles = [
            Vec3::new(0.0, h, HANDLE_Z_OFFSET),
            Vec3::new(0.0, -h, HANDLE_Z_OFFSET),
            Vec3::new(-w, 0.0, HANDLE_Z_OFFSET),
            Vec3::new(w, 0.0, HANDLE_Z_OFFSET),
        ];
    }

    /// Rotation from the local frame into world space.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.orientation.x,
            self.orientation.y,
            self.orientation.z,
        )
    }

    /// Convert a world-space point into the surface's local frame.
    #[must_use]
    pub fn world_to_local(&self, world: Vec3) -> Vec3 {
        self.rotation().inverse() * (world - self.position)
    }

    /// Convert a local-space point into world space.
    #[must_use]
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation() * local
    }

    /// Unit normal of the drawing face in world space.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    /// Drag `handle` to a point given in the local frame.
    ///
    /// Vertical handles set the height to twice the distance from the
    /// center line, horizontal handles the width. Both clamp to
    /// [`MIN_EXTENT`].
    pub fn resize_from_local(&mut self, handle: HandleId, local: Vec3) {
        if handle.is_vertical() {
            self.height = clamp_extent(local.y.abs() * 2.0);
        } else {
            self.width = clamp_extent(local.x.abs() * 2.0);
        }
        self.recompute_handles();
    }

    /// Drag `handle` to a world-space hit point.
    pub fn continue_resize(&mut self, handle: HandleId, world: Vec3) {
        let local = self.world_to_local(world);
        self.resize_from_local(handle, local);
    }

    /// Apply a screen drag to the orientation.
    ///
    /// Returns the `(yaw, pitch)` increments that were added.
    pub fn rotate(&mut self, dx: f32, dy: f32) -> (f32, f32) {
        let d_yaw = -dx / ROTATION_SENSITIVITY;
        let d_pitch = -dy / ROTATION_SENSITIVITY;
        self.orientation.y += d_yaw;
        self.orientation.x += d_pitch;
        (d_yaw, d_pitch)
    }

    /// Whether a local-space point lies on the rectangle (ignoring z).
    #[must_use]
    pub fn contains_local(&self, local: Vec3) -> bool {
        local.x.abs() <= self.width / 2.0 && local.y.abs() <= self.height / 2.0
    }
}

fn clamp_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_EXTENT)
    } else {
        MIN_EXTENT
    }
}

/// Tracks the handle grabbed by an in-progress resize gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResizeTracker {
    active: Option<HandleId>,
}

impl ResizeTracker {
    /// Create a tracker with no active handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grab the first handle of `surface` among the objects under the pointer.
    ///
    /// Hits that are not handles of `surface` are skipped. Without a match
    /// the gesture has no active handle and later updates do nothing.
    pub fn begin<I>(&mut self, surface: SurfaceId, hits: I) -> Option<HandleId>
    where
        I: IntoIterator<Item = ObjectId>,
    {
        self.active = hits.into_iter().find_map(|object| match object {
            ObjectId::Handle(owner, handle) if owner == surface => Some(handle),
            _ => None,
        });
        self.active
    }

    /// Currently grabbed handle.
    #[must_use]
    pub fn active(&self) -> Option<HandleId> {
        self.active
    }

    /// Move the grabbed handle to `world`.
    ///
    /// Returns the new `(width, height)`, or `None` with no active handle.
    pub fn update(&self, geometry: &mut SurfaceGeometry, world: Vec3) -> Option<(f32, f32)> {
        let handle = self.active?;
        geometry.continue_resize(handle, world);
        Some((geometry.width(), geometry.height()))
    }

    /// Release the handle.
    pub fn end(&mut self) {
        self.active = None;
    }
}
