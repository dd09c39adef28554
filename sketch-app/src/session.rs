//! The interaction session.
//!
//! A [`SketchSession`] owns the scene table, the shared canvas and the
//! gesture router, and is driven from a single interaction thread. Toolbar
//! controls map onto its methods one to one. Description requests are the
//! only asynchronous work: the snapshot is taken here, the request runs on a
//! tokio task, and the answer is queued until the next
//! [`SketchSession::poll_descriptions`].

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use sketch_core::smoother::{DEFAULT_GRID_SIZE, DEFAULT_LINE_WIDTH};
use sketch_core::{
    BackgroundColor, ControlState, GestureRouter, InputChannel, InteractionMode, ModeToggle,
    ObjectId, PenColor, PlaneAnchor, PointerEvent, RouteOutcome, Scene, SceneHost, StrokeStyle,
    StrokeTarget, Surface, SurfaceGeometry, SurfaceId,
};
use sketch_renderer::{CanvasImage, DEFAULT_CANVAS_SIZE, DEFAULT_JPEG_QUALITY};
use sketch_vision::DescribeSketch;
use tokio::sync::mpsc;

use crate::error::{SessionError, SessionResult};

/// Distance in front of the camera for a manually placed surface.
pub const MANUAL_PLACEMENT_DISTANCE: f32 = 0.5;

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side of the square canvas in pixels.
    pub canvas_size: u32,
    /// Snap grid spacing in canvas pixels.
    pub grid_size: f32,
    /// Pen width in canvas pixels.
    pub pen_width: f32,
    /// JPEG quality for description snapshots.
    pub jpeg_quality: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            grid_size: DEFAULT_GRID_SIZE,
            pen_width: DEFAULT_LINE_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// A dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The service described the sketch.
    Description {
        /// Description text.
        text: String,
        /// The canvas changed after the snapshot was taken.
        stale: bool,
    },
    /// The description request failed.
    DescriptionFailed {
        /// Human readable reason.
        message: String,
        /// The canvas changed after the snapshot was taken.
        stale: bool,
    },
}

impl Notice {
    /// Text to show.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Description { text, .. } => text,
            Self::DescriptionFailed { message, .. } => message,
        }
    }

    /// Whether the notice refers to an earlier canvas.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        match self {
            Self::Description { stale, .. } | Self::DescriptionFailed { stale, .. } => *stale,
        }
    }
}

struct Completed {
    generation: u64,
    /// Description text, or the reason there is none.
    result: Result<String, String>,
}

/// One AR drawing session.
pub struct SketchSession<H: SceneHost> {
    config: SessionConfig,
    host: H,
    scene: Scene,
    router: GestureRouter,
    canvas: Option<CanvasImage>,
    pen: PenColor,
    background: BackgroundColor,
    /// Bumped whenever the canvas is replaced or dropped.
    generation: u64,
    describer: Option<Arc<dyn DescribeSketch>>,
    results_tx: mpsc::UnboundedSender<Completed>,
    results_rx: mpsc::UnboundedReceiver<Completed>,
    pending: usize,
    notices: VecDeque<Notice>,
}

impl<H: SceneHost> SketchSession<H> {
    /// Create a session with no surfaces and no canvas.
    #[must_use]
    pub fn new(host: H, config: SessionConfig) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let pen = PenColor::default();
        let mut router = GestureRouter::new().with_grid_size(config.grid_size);
        router.set_style(StrokeStyle {
            color: pen.rgba(),
            width: config.pen_width,
        });
        Self {
            config,
            host,
            scene: Scene::new(),
            router,
            canvas: None,
            pen,
            background: BackgroundColor::default(),
            generation: 0,
            describer: None,
            results_tx,
            results_rx,
            pending: 0,
            notices: VecDeque::new(),
        }
    }

    /// Attach a description service.
    #[must_use]
    pub fn with_describer(mut self, describer: Arc<dyn DescribeSketch>) -> Self {
        self.describer = Some(describer);
        self
    }

    /// Session tunables.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The AR host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the AR host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The scene table.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The shared canvas, once created.
    #[must_use]
    pub fn canvas(&self) -> Option<&CanvasImage> {
        self.canvas.as_ref()
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.router.mode()
    }

    /// Toolbar toggle state.
    #[must_use]
    pub fn controls(&self) -> ControlState {
        self.router.modes().controls()
    }

    /// Current pen color.
    #[must_use]
    pub fn pen(&self) -> PenColor {
        self.pen
    }

    /// Current background color.
    #[must_use]
    pub fn background(&self) -> BackgroundColor {
        self.background
    }

    /// Canvas generation; description results from older ones are stale.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a description service is attached.
    #[must_use]
    pub fn can_describe(&self) -> bool {
        self.describer.is_some()
    }

    /// Requests sent but not yet delivered.
    #[must_use]
    pub fn pending_descriptions(&self) -> usize {
        self.pending
    }

    // ---------------------------------------------------------------------
    // Controls
    // ---------------------------------------------------------------------

    /// Switch resize or rotate mode on or off.
    pub fn set_mode(&mut self, toggle: ModeToggle, enabled: bool) -> ControlState {
        self.router.set_mode(toggle, enabled)
    }

    /// Flip resize or rotate mode.
    pub fn toggle_mode(&mut self, toggle: ModeToggle) -> ControlState {
        self.router.toggle_mode(toggle)
    }

    /// Flip grid snapping.
    pub fn toggle_snap_to_grid(&mut self) -> ControlState {
        self.router.toggle_snap_to_grid()
    }

    /// Change the ink for later strokes.
    pub fn set_pen_color(&mut self, pen: PenColor) {
        self.pen = pen;
        self.router.set_style(StrokeStyle {
            color: pen.rgba(),
            width: self.config.pen_width,
        });
        tracing::debug!("Pen color set to {pen:?}");
    }

    /// Replace the canvas with a blank one in `background`.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas cannot be allocated or encoded.
    pub fn set_background_color(&mut self, background: BackgroundColor) -> SessionResult<()> {
        self.background = background;
        tracing::info!("Background set to {background:?}");
        self.reset_canvas()
    }

    /// Replace the canvas with a blank one in the current background.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas cannot be allocated or encoded.
    pub fn clear_canvas(&mut self) -> SessionResult<()> {
        tracing::info!("Canvas cleared");
        self.reset_canvas()
    }

    // ---------------------------------------------------------------------
    // Surface lifecycle
    // ---------------------------------------------------------------------

    /// The tracker found a plane. The first one gets a surface lying on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas cannot be allocated or encoded.
    pub fn on_plane_detected(&mut self, anchor: &PlaneAnchor) -> SessionResult<Option<SurfaceId>> {
        if !self.scene.is_empty() {
            tracing::debug!("Plane {} ignored: a surface already exists", anchor.id);
            return Ok(None);
        }
        let geometry =
            SurfaceGeometry::default().with_pose(anchor.center, Vec3::new(-FRAC_PI_2, 0.0, 0.0));
        let surface = Surface::new(geometry).with_anchor(anchor.id.clone());
        self.place(surface).map(Some)
    }

    /// Place a surface by hand.
    ///
    /// Uses the detected plane under the screen center if there is one,
    /// otherwise a spot in front of the camera facing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas cannot be allocated or encoded.
    pub fn add_surface(&mut self) -> SessionResult<Option<SurfaceId>> {
        if !self.scene.is_empty() {
            tracing::debug!("Add surface ignored: a surface already exists");
            return Ok(None);
        }
        let geometry = if let Some(hit) = self.host.screen_center_plane_hit() {
            SurfaceGeometry::default().with_pose(hit, Vec3::ZERO)
        } else if let Some(camera) = self.host.camera_pose() {
            let position = camera.position + camera.forward * MANUAL_PLACEMENT_DISTANCE;
            SurfaceGeometry::default().with_pose(position, Vec3::new(0.0, camera.yaw + PI, 0.0))
        } else {
            tracing::debug!("Add surface ignored: no camera frame yet");
            return Ok(None);
        };
        self.place(Surface::new(geometry)).map(Some)
    }

    /// Remove every surface and drop the canvas.
    pub fn delete_all(&mut self) -> usize {
        let removed = self.scene.clear();
        self.router.reset();
        self.drop_canvas();
        tracing::info!("Deleted {removed} surface(s)");
        removed
    }

    /// Remove the active surface and drop the canvas with it.
    ///
    /// A session holds at most one surface: placement is refused while one
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene no longer knows the active surface.
    pub fn remove_active_surface(&mut self) -> SessionResult<Option<SurfaceId>> {
        let Some(id) = self.scene.active_id() else {
            return Ok(None);
        };
        self.scene.remove_surface(&id)?;
        self.router.reset();
        self.drop_canvas();
        Ok(Some(id))
    }

    fn place(&mut self, surface: Surface) -> SessionResult<SurfaceId> {
        let id = self.scene.add_surface(surface);
        if self.canvas.is_none() {
            self.canvas = Some(self.blank_canvas()?);
        }
        self.publish_canvas()?;
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Gestures
    // ---------------------------------------------------------------------

    /// Route one pointer event, repainting the surface when ink was added.
    ///
    /// # Errors
    ///
    /// Returns an error if a lazily created canvas cannot be allocated or
    /// the updated canvas cannot be encoded.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> SessionResult<RouteOutcome> {
        let draws = event.channel == InputChannel::Pan && self.mode() == InteractionMode::Draw;
        if draws && self.canvas.is_none() && self.scene.active_id().is_some() {
            tracing::debug!("Creating canvas for first stroke");
            self.canvas = Some(self.blank_canvas()?);
        }

        let target = self
            .canvas
            .as_mut()
            .map(|canvas| canvas as &mut dyn StrokeTarget);
        let outcome = self
            .router
            .handle(event, &mut self.scene, &self.host, target);

        if outcome.painted() {
            self.publish_canvas()?;
        }
        Ok(outcome)
    }

    // ---------------------------------------------------------------------
    // Descriptions
    // ---------------------------------------------------------------------

    /// Snapshot the canvas and ask the service to describe it.
    ///
    /// Returns once the request is in flight. Every request is delivered
    /// exactly once, including one whose task panicked or was aborted.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DescriberUnavailable`] without a service,
    /// [`SessionError::NoCanvas`] before anything was created,
    /// [`SessionError::NoRuntime`] outside a tokio runtime, and a render
    /// error if the snapshot cannot be encoded.
    pub fn request_description(&mut self) -> SessionResult<()> {
        let describer = self
            .describer
            .clone()
            .ok_or(SessionError::DescriberUnavailable)?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let canvas = self.canvas.as_ref().ok_or(SessionError::NoCanvas)?;
        let jpeg = canvas.snapshot_jpeg(self.config.jpeg_quality)?;

        let generation = self.generation;
        let results = self.results_tx.clone();
        tracing::info!(bytes = jpeg.len(), generation, "Requesting description");
        runtime.spawn(async move {
            let request = tokio::spawn(async move { describer.describe(&jpeg).await });
            let result = match request.await {
                Ok(result) => result.map_err(|err| err.to_string()),
                Err(err) => Err(format!("description task failed: {err}")),
            };
            if results.send(Completed { generation, result }).is_err() {
                tracing::debug!("Session closed before description arrived");
            }
        });
        self.pending += 1;
        Ok(())
    }

    /// Deliver finished requests without waiting.
    pub fn poll_descriptions(&mut self) -> Vec<Notice> {
        let mut delivered = Vec::new();
        while let Ok(done) = self.results_rx.try_recv() {
            delivered.push(self.deliver(done));
        }
        delivered
    }

    /// Wait for every request in flight and deliver the results.
    pub async fn wait_descriptions(&mut self) -> Vec<Notice> {
        let mut delivered = self.poll_descriptions();
        while self.pending > 0 {
            let Some(done) = self.results_rx.recv().await else {
                break;
            };
            delivered.push(self.deliver(done));
        }
        delivered
    }

    fn deliver(&mut self, done: Completed) -> Notice {
        self.pending = self.pending.saturating_sub(1);
        let stale = done.generation != self.generation;
        let notice = match done.result {
            Ok(text) => {
                tracing::info!(stale, "Description received");
                Notice::Description { text, stale }
            }
            Err(message) => {
                tracing::warn!(stale, "Description failed: {message}");
                Notice::DescriptionFailed { message, stale }
            }
        };
        self.notices.push_back(notice.clone());
        notice
    }

    // ---------------------------------------------------------------------
    // Notices
    // ---------------------------------------------------------------------

    /// Notices not yet dismissed, oldest first.
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Dismiss the oldest notice.
    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    // ---------------------------------------------------------------------
    // Canvas plumbing
    // ---------------------------------------------------------------------

    fn blank_canvas(&self) -> SessionResult<CanvasImage> {
        Ok(CanvasImage::square(
            self.config.canvas_size,
            self.background.rgba(),
        )?)
    }

    fn reset_canvas(&mut self) -> SessionResult<()> {
        self.canvas = Some(self.blank_canvas()?);
        self.generation += 1;
        self.publish_canvas()
    }

    fn drop_canvas(&mut self) {
        if self.canvas.take().is_some() {
            self.generation += 1;
        }
    }

    /// Push the canvas onto the active surface's material.
    fn publish_canvas(&mut self) -> SessionResult<()> {
        let (Some(surface), Some(canvas)) = (self.scene.active_id(), self.canvas.as_ref()) else {
            return Ok(());
        };
        let png = canvas.snapshot()?;
        self.host.apply_material(ObjectId::Plane(surface), &png);
        Ok(())
    }
}
