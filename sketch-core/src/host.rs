//! Boundary to the AR/3D host that tracks planes and renders the scene.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{AnchorId, ObjectId, Scene};

/// Which objects a hit test considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitFilter {
    /// Rendered scene objects (surface planes and handles).
    Objects,
    /// Edge handles only.
    Handles,
    /// Real-world geometry: detected planes and feature points.
    Planes,
}

/// One result of a hit test, nearest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneHit {
    /// World-space intersection point.
    pub world: Vec3,
    /// Scene object that was hit; `None` for real-world geometry.
    pub object: Option<ObjectId>,
    /// Texture coordinates on a plane hit (v up).
    pub uv: Option<Vec2>,
}

impl SceneHit {
    /// Hit on real-world geometry.
    #[must_use]
    pub fn world(world: Vec3) -> Self {
        Self {
            world,
            object: None,
            uv: None,
        }
    }

    /// Hit on a scene object.
    #[must_use]
    pub fn object(world: Vec3, object: ObjectId) -> Self {
        Self {
            world,
            object: Some(object),
            uv: None,
        }
    }

    /// Attach texture coordinates.
    #[must_use]
    pub fn with_uv(mut self, uv: Vec2) -> Self {
        self.uv = Some(uv);
        self
    }
}

/// Pose of the device camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// World-space camera position.
    pub position: Vec3,
    /// Unit vector the camera looks along.
    pub forward: Vec3,
    /// Camera yaw in radians.
    pub yaw: f32,
}

/// A real-world plane reported by the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneAnchor {
    /// Tracker identifier.
    pub id: AnchorId,
    /// World-space center of the detected extent.
    pub center: Vec3,
}

/// The AR session and 3D scene renderer.
///
/// Implementations render the [`Scene`] table and answer spatial queries
/// against it and the tracked world.
pub trait SceneHost {
    /// Objects under a screen point, nearest first.
    fn hit_test(&self, scene: &Scene, screen: Vec2, filter: HitFilter) -> Vec<SceneHit>;

    /// Display an encoded image on an object's material.
    fn apply_material(&mut self, object: ObjectId, image: &[u8]);

    /// Detected plane under the center of the screen, if any.
    fn screen_center_plane_hit(&self) -> Option<Vec3>;

    /// Current camera pose; `None` before the first tracked frame.
    fn camera_pose(&self) -> Option<CameraPose>;
}
