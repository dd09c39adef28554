//! A simulated AR host.
//!
//! Stands in for the device session: a pinhole camera looking into a world
//! made of the scene's surfaces plus any planes the script declares as
//! detected. Hit tests are plain ray casts, and applied materials are kept
//! so callers can inspect what the renderer would have shown.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_3, PI};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use sketch_core::geometry::HANDLE_RADIUS;
use sketch_core::{CameraPose, HitFilter, ObjectId, PlaneAnchor, Scene, SceneHit, SceneHost};

/// Default viewport width in screen points.
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
/// Default viewport height in screen points.
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
/// Default vertical field of view (60 degrees).
pub const DEFAULT_FOV_Y: f32 = FRAC_PI_3;

const PARALLEL_EPSILON: f32 = 1e-6;

/// Camera at `position` turned to `yaw` around the vertical axis.
///
/// Yaw zero looks along +Z; yaw π looks along −Z.
#[must_use]
pub fn camera_at(position: Vec3, yaw: f32) -> CameraPose {
    CameraPose {
        position,
        forward: Vec3::new(yaw.sin(), 0.0, yaw.cos()),
        yaw,
    }
}

/// A real-world plane known to the simulated tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPlane {
    /// Anchor reported to the session.
    pub anchor: PlaneAnchor,
    /// Unit normal of the plane.
    pub normal: Vec3,
}

impl DetectedPlane {
    /// A horizontal plane through `anchor.center`.
    #[must_use]
    pub fn horizontal(anchor: PlaneAnchor) -> Self {
        Self {
            anchor,
            normal: Vec3::Y,
        }
    }
}

/// Scripted [`SceneHost`].
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    viewport: Vec2,
    fov_y: f32,
    camera: Option<CameraPose>,
    planes: Vec<DetectedPlane>,
    handle_radius: f32,
    materials: HashMap<ObjectId, Vec<u8>>,
    material_updates: usize,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT)
    }
}

impl SimulatedHost {
    /// Host with a tracked camera at the origin looking along −Z.
    #[must_use]
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport: Vec2::new(viewport_width.max(1.0), viewport_height.max(1.0)),
            fov_y: DEFAULT_FOV_Y,
            camera: Some(camera_at(Vec3::ZERO, PI)),
            planes: Vec::new(),
            handle_radius: HANDLE_RADIUS,
            materials: HashMap::new(),
            material_updates: 0,
        }
    }

    /// Set the vertical field of view in radians.
    #[must_use]
    pub fn with_fov(mut self, fov_y: f32) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Set the camera pose.
    #[must_use]
    pub fn with_camera(mut self, camera: CameraPose) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Host that has not produced a tracked frame yet.
    #[must_use]
    pub fn without_tracking(mut self) -> Self {
        self.camera = None;
        self
    }

    /// Viewport size in screen points.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Screen center.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    /// Move the camera, or lose tracking with `None`.
    pub fn set_camera(&mut self, camera: Option<CameraPose>) {
        self.camera = camera;
    }

    /// Make a plane known to the tracker.
    pub fn add_plane(&mut self, plane: DetectedPlane) {
        tracing::debug!("Simulated plane {} detected", plane.anchor.id);
        self.planes.push(plane);
    }

    /// Planes known to the tracker.
    #[must_use]
    pub fn planes(&self) -> &[DetectedPlane] {
        &self.planes
    }

    /// Last image applied to an object.
    #[must_use]
    pub fn material(&self, object: ObjectId) -> Option<&[u8]> {
        self.materials.get(&object).map(Vec::as_slice)
    }

    /// How many times any material was replaced.
    #[must_use]
    pub fn material_updates(&self) -> usize {
        self.material_updates
    }

    /// Screen point of a world position, if it is in front of the camera.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let camera = self.camera?;
        let (right, up) = basis(camera.forward);
        let relative = world - camera.position;
        let depth = relative.dot(camera.forward);
        if depth <= 0.0 {
            return None;
        }
        let half = (self.fov_y * 0.5).tan();
        let aspect = self.viewport.x / self.viewport.y;
        let x = relative.dot(right) / depth / (aspect * half);
        let y = relative.dot(up) / depth / half;
        Some(Vec2::new(
            (x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - y) * 0.5 * self.viewport.y,
        ))
    }

    /// Ray through a screen point as `(origin, unit direction)`.
    fn ray(&self, screen: Vec2) -> Option<(Vec3, Vec3)> {
        let camera = self.camera?;
        let (right, up) = basis(camera.forward);
        let half = (self.fov_y * 0.5).tan();
        let aspect = self.viewport.x / self.viewport.y;
        let x = (2.0 * screen.x / self.viewport.x - 1.0) * aspect * half;
        let y = (1.0 - 2.0 * screen.y / self.viewport.y) * half;
        let direction = (camera.forward + right * x + up * y).normalize();
        Some((camera.position, direction))
    }

    fn handle_hits(
        &self,
        scene: &Scene,
        origin: Vec3,
        direction: Vec3,
        out: &mut Vec<(f32, SceneHit)>,
    ) {
        for surface in scene.surfaces() {
            for object in surface.objects().filter(|o| o.handle().is_some()) {
                let Some(center) = surface.world_position(object) else {
                    continue;
                };
                if let Some(t) = intersect_sphere(origin, direction, center, self.handle_radius) {
                    out.push((t, SceneHit::object(origin + direction * t, object)));
                }
            }
        }
    }

    /// Detected planes, then the walls behind each surface as feature points.
    fn world_hits(
        &self,
        scene: &Scene,
        origin: Vec3,
        direction: Vec3,
        out: &mut Vec<(f32, SceneHit)>,
    ) {
        let detected = self.planes.iter().map(|p| (p.anchor.center, p.normal));
        let features = scene
            .surfaces()
            .map(|s| (s.geometry.position, s.geometry.normal()));
        for (point, normal) in detected.chain(features) {
            if let Some(t) = intersect_plane(origin, direction, point, normal) {
                out.push((t, SceneHit::world(origin + direction * t)));
            }
        }
    }
}

impl SceneHost for SimulatedHost {
    fn hit_test(&self, scene: &Scene, screen: Vec2, filter: HitFilter) -> Vec<SceneHit> {
        let Some((origin, direction)) = self.ray(screen) else {
            return Vec::new();
        };
        let mut hits = Vec::new();
        match filter {
            HitFilter::Objects => {
                surface_hits(scene, origin, direction, &mut hits);
                self.handle_hits(scene, origin, direction, &mut hits);
            }
            HitFilter::Handles => self.handle_hits(scene, origin, direction, &mut hits),
            HitFilter::Planes => self.world_hits(scene, origin, direction, &mut hits),
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }

    fn apply_material(&mut self, object: ObjectId, image: &[u8]) {
        tracing::trace!("Material for {} replaced ({} bytes)", object.name(), image.len());
        self.materials.insert(object, image.to_vec());
        self.material_updates += 1;
    }

    fn screen_center_plane_hit(&self) -> Option<Vec3> {
        let (origin, direction) = self.ray(self.center())?;
        self.planes
            .iter()
            .filter_map(|p| intersect_plane(origin, direction, p.anchor.center, p.normal))
            .min_by(f32::total_cmp)
            .map(|t| origin + direction * t)
    }

    fn camera_pose(&self) -> Option<CameraPose> {
        self.camera
    }
}

/// Surface rectangles under the ray, with texture coordinates.
fn surface_hits(scene: &Scene, origin: Vec3, direction: Vec3, out: &mut Vec<(f32, SceneHit)>) {
    for surface in scene.surfaces() {
        let geometry = &surface.geometry;
        let Some(t) = intersect_plane(origin, direction, geometry.position, geometry.normal())
        else {
            continue;
        };
        let world = origin + direction * t;
        let local = geometry.world_to_local(world);
        if geometry.contains_local(local) {
            let uv = Vec2::new(
                local.x / geometry.width() + 0.5,
                local.y / geometry.height() + 0.5,
            );
            let hit = SceneHit::object(world, ObjectId::Plane(surface.id)).with_uv(uv);
            out.push((t, hit));
        }
    }
}

/// Camera right and up vectors for a forward direction.
fn basis(forward: Vec3) -> (Vec3, Vec3) {
    let right = forward.cross(Vec3::Y).normalize_or_zero();
    let right = if right == Vec3::ZERO { Vec3::X } else { right };
    (right, right.cross(forward))
}

fn intersect_plane(origin: Vec3, direction: Vec3, point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = normal.dot(direction);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (point - origin).dot(normal) / denom;
    (t > 0.0).then_some(t)
}

fn intersect_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    [-b - root, -b + root].into_iter().find(|t| *t > 0.0)
}
