//! Scene-object table for placed surfaces.
//!
//! Each surface owns its geometry. The plane and handle objects a host
//! renders for it are addressed by [`ObjectId`] values rather than live
//! node references; parents are recovered with [`ObjectId::parent`].

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{HandleId, SurfaceGeometry};
use crate::{SketchError, SketchResult};

/// Unique identifier for a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    /// Create a new unique surface ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host identifier of a detected real-world plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub String);

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address of a renderable object belonging to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ObjectId {
    /// The container positioned in the world.
    Surface(SurfaceId),
    /// The drawable rectangle, child of the surface container.
    Plane(SurfaceId),
    /// An edge handle, child of the plane.
    Handle(SurfaceId, HandleId),
}

impl ObjectId {
    /// Surface that owns this object.
    #[must_use]
    pub const fn surface(self) -> SurfaceId {
        match self {
            Self::Surface(id) | Self::Plane(id) | Self::Handle(id, _) => id,
        }
    }

    /// Parent object, if any.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Surface(_) => None,
            Self::Plane(id) => Some(Self::Surface(id)),
            Self::Handle(id, _) => Some(Self::Plane(id)),
        }
    }

    /// Scene name of the object.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Surface(_) => "surface",
            Self::Plane(_) => "plane",
            Self::Handle(_, handle) => handle.name(),
        }
    }

    /// Handle addressed by this object, if it is one.
    #[must_use]
    pub const fn handle(self) -> Option<HandleId> {
        match self {
            Self::Handle(_, handle) => Some(handle),
            _ => None,
        }
    }
}

/// A placed drawable surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    /// Unique identifier.
    pub id: SurfaceId,
    /// Size and pose.
    pub geometry: SurfaceGeometry,
    /// Detected plane the surface was spawned on, if any.
    pub anchor: Option<AnchorId>,
}

impl Surface {
    /// Create a free-standing surface.
    #[must_use]
    pub fn new(geometry: SurfaceGeometry) -> Self {
        Self {
            id: SurfaceId::new(),
            geometry,
            anchor: None,
        }
    }

    /// Attach the surface to a detected plane.
    #[must_use]
    pub fn with_anchor(mut self, anchor: AnchorId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Every object rendered for this surface, parents first.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        let id = self.id;
        [ObjectId::Surface(id), ObjectId::Plane(id)]
            .into_iter()
            .chain(HandleId::ALL.into_iter().map(move |h| ObjectId::Handle(id, h)))
    }

    /// World position of one of this surface's objects.
    #[must_use]
    pub fn world_position(&self, object: ObjectId) -> Option<Vec3> {
        if object.surface() != self.id {
            return None;
        }
        match object {
            ObjectId::Surface(_) | ObjectId::Plane(_) => Some(self.geometry.position),
            ObjectId::Handle(_, handle) => Some(
                self.geometry
                    .local_to_world(self.geometry.handle_offset(handle)),
            ),
        }
    }
}

/// All surfaces in the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    surfaces: HashMap<SurfaceId, Surface>,
    /// Insertion order.
    order: Vec<SurfaceId>,
    /// Surface receiving drawing and manipulation.
    active: Option<SurfaceId>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface. The first surface added becomes the active one.
    pub fn add_surface(&mut self, surface: Surface) -> SurfaceId {
        let id = surface.id;
        self.order.push(id);
        self.surfaces.insert(id, surface);
        if self.active.is_none() {
            self.active = Some(id);
        }
        tracing::info!("Surface {id} added");
        id
    }

    /// Remove a surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is not found.
    pub fn remove_surface(&mut self, id: &SurfaceId) -> SketchResult<Surface> {
        let surface = self
            .surfaces
            .remove(id)
            .ok_or(SketchError::SurfaceNotFound(*id))?;
        self.order.retain(|sid| sid != id);
        if self.active == Some(*id) {
            self.active = self.order.last().copied();
        }
        tracing::info!("Surface {id} removed");
        Ok(surface)
    }

    /// Remove every surface, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.surfaces.len();
        self.surfaces.clear();
        self.order.clear();
        self.active = None;
        removed
    }

    /// Get a surface by ID.
    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// Get a mutable reference to a surface by ID.
    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&id)
    }

    /// ID of the active surface.
    #[must_use]
    pub fn active_id(&self) -> Option<SurfaceId> {
        self.active
    }

    /// The active surface.
    #[must_use]
    pub fn active_surface(&self) -> Option<&Surface> {
        self.active.and_then(|id| self.surfaces.get(&id))
    }

    /// Mutable access to the active surface.
    pub fn active_surface_mut(&mut self) -> Option<&mut Surface> {
        let id = self.active?;
        self.surfaces.get_mut(&id)
    }

    /// Surfaces in insertion order.
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.order.iter().filter_map(|id| self.surfaces.get(id))
    }

    /// Every renderable object in the scene.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.surfaces().flat_map(Surface::objects)
    }

    /// World position of any object in the scene.
    #[must_use]
    pub fn world_position(&self, object: ObjectId) -> Option<Vec3> {
        self.get(object.surface())?.world_position(object)
    }

    /// Number of surfaces.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SketchResult<String> {
        serde_json::to_string(self).map_err(SketchError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> SketchResult<Self> {
        serde_json::from_str(json).map_err(SketchError::Serialization)
    }
}
