//! Gesture routing.
//!
//! ```text
//!                 ┌──────────── Draw ────► StrokeSmoother ──► StrokeTarget
//! PointerEvent ──►│ Pan ─ mode ─ Resize ─┐
//!                 │              Rotate ─┼─► SurfaceGeometry
//!                 └ LongPress ───────────┘   (ResizeTracker)
//! ```
//!
//! Every event is handled synchronously against the current scene, in the
//! order the host delivers them.

use glam::Vec2;

use crate::event::{GesturePhase, InputChannel, PointerEvent};
use crate::geometry::{HandleId, ResizeTracker};
use crate::host::{HitFilter, SceneHost};
use crate::scene::{ObjectId, Scene, SurfaceId};
use crate::smoother::{
    snap_to_grid, uv_to_canvas, StrokeSegment, StrokeSmoother, StrokeStyle, StrokeTarget,
    DEFAULT_GRID_SIZE,
};
use crate::state::{ControlState, InteractionMode, ModeState, ModeToggle};

/// Progress of the gesture on one input channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GestureStage {
    /// No gesture seen yet.
    #[default]
    NotStarted,
    /// Between down and up/cancel.
    InProgress,
    /// Last gesture finished.
    Ended,
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteOutcome {
    /// A stroke began at this canvas point.
    StrokeStarted(Vec2),
    /// A segment was painted onto the target.
    Painted(StrokeSegment),
    /// A resize gesture grabbed a handle.
    HandleGrabbed(HandleId),
    /// The surface was resized.
    Resized {
        /// Handle being dragged.
        handle: HandleId,
        /// New width in meters.
        width: f32,
        /// New height in meters.
        height: f32,
    },
    /// The surface was rotated by these increments (radians).
    Rotated {
        /// Yaw increment.
        yaw: f32,
        /// Pitch increment.
        pitch: f32,
    },
    /// The gesture finished and its sub-state was cleared.
    Ended,
    /// Nothing applicable (no surface, no hit, no handle, ...).
    Ignored,
}

impl RouteOutcome {
    /// Whether the canvas pixels changed.
    #[must_use]
    pub fn painted(&self) -> bool {
        matches!(self, Self::Painted(_))
    }
}

/// Routes pointer gestures to drawing, resizing or rotating.
#[derive(Debug, Clone)]
pub struct GestureRouter {
    modes: ModeState,
    smoother: StrokeSmoother,
    resize: ResizeTracker,
    style: StrokeStyle,
    grid_size: f32,
    pan_stage: GestureStage,
    long_press_stage: GestureStage,
}

impl Default for GestureRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRouter {
    /// Create a router in draw mode with the default pen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modes: ModeState::new(),
            smoother: StrokeSmoother::new(),
            resize: ResizeTracker::new(),
            style: StrokeStyle::default(),
            grid_size: DEFAULT_GRID_SIZE,
            pan_stage: GestureStage::NotStarted,
            long_press_stage: GestureStage::NotStarted,
        }
    }

    /// Set the snap-to-grid spacing in canvas pixels.
    #[must_use]
    pub fn with_grid_size(mut self, grid_size: f32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Mode selection.
    #[must_use]
    pub fn modes(&self) -> &ModeState {
        &self.modes
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.modes.mode()
    }

    /// Enable or disable resize/rotate mode.
    pub fn set_mode(&mut self, toggle: ModeToggle, enabled: bool) -> ControlState {
        self.modes.set_mode(toggle, enabled)
    }

    /// Flip resize/rotate mode.
    pub fn toggle_mode(&mut self, toggle: ModeToggle) -> ControlState {
        self.modes.toggle(toggle)
    }

    /// Flip snap-to-grid.
    pub fn toggle_snap_to_grid(&mut self) -> ControlState {
        self.modes.toggle_snap_to_grid()
    }

    /// Pen used for new segments.
    #[must_use]
    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Change the pen. Applies to segments painted from now on.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    /// Progress of the gesture on a channel.
    #[must_use]
    pub fn stage(&self, channel: InputChannel) -> GestureStage {
        match channel {
            InputChannel::Pan => self.pan_stage,
            InputChannel::LongPress => self.long_press_stage,
        }
    }

    /// Whether a stroke is being drawn.
    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.smoother.is_active()
    }

    /// Handle grabbed by an in-progress resize.
    #[must_use]
    pub fn active_handle(&self) -> Option<HandleId> {
        self.resize.active()
    }

    /// Drop any in-progress stroke or resize.
    pub fn reset(&mut self) {
        self.smoother.end();
        self.resize.end();
    }

    /// Handle one pointer event.
    ///
    /// `target` is the canvas of the active surface; drawing is ignored
    /// without one. Up and Cancel end the grabbed handle whatever the
    /// current mode, since the mode may have changed mid-gesture.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        scene: &mut Scene,
        host: &dyn SceneHost,
        target: Option<&mut dyn StrokeTarget>,
    ) -> RouteOutcome {
        let stage = match event.phase {
            GesturePhase::Down => GestureStage::InProgress,
            GesturePhase::Move => self.stage(event.channel),
            GesturePhase::Up | GesturePhase::Cancel => GestureStage::Ended,
        };
        match event.channel {
            InputChannel::Pan => self.pan_stage = stage,
            InputChannel::LongPress => self.long_press_stage = stage,
        }

        if event.phase.is_terminal() {
            self.resize.end();
            if event.channel == InputChannel::Pan {
                self.smoother.end();
            }
            return RouteOutcome::Ended;
        }

        match event.channel {
            InputChannel::LongPress => self.route_resize(event, scene, host),
            InputChannel::Pan => match self.modes.mode() {
                InteractionMode::Draw => self.route_draw(event, scene, host, target),
                InteractionMode::Resize => self.route_resize(event, scene, host),
                InteractionMode::Rotate => Self::route_rotate(event, scene),
            },
        }
    }

    fn route_draw(
        &mut self,
        event: &PointerEvent,
        scene: &Scene,
        host: &dyn SceneHost,
        target: Option<&mut dyn StrokeTarget>,
    ) -> RouteOutcome {
        let Some(surface) = scene.active_id() else {
            tracing::debug!("Draw ignored: no surface");
            return RouteOutcome::Ignored;
        };
        let Some(target) = target else {
            tracing::debug!("Draw ignored: no canvas");
            return RouteOutcome::Ignored;
        };
        let Some(point) = self.canvas_point(event.position, surface, scene, host, target.size())
        else {
            tracing::debug!("Draw ignored: pointer is off the surface");
            return RouteOutcome::Ignored;
        };

        match event.phase {
            GesturePhase::Down => {
                self.smoother.begin(point);
                RouteOutcome::StrokeStarted(point)
            }
            _ => match self.smoother.extend(point) {
                Some(segment) => {
                    target.paint_segment(&segment, &self.style);
                    RouteOutcome::Painted(segment)
                }
                None => RouteOutcome::Ignored,
            },
        }
    }

    /// Canvas pixel under a screen point, snapped when enabled.
    fn canvas_point(
        &self,
        screen: Vec2,
        surface: SurfaceId,
        scene: &Scene,
        host: &dyn SceneHost,
        size: (u32, u32),
    ) -> Option<Vec2> {
        let uv = host
            .hit_test(scene, screen, HitFilter::Objects)
            .into_iter()
            .find(|hit| hit.object == Some(ObjectId::Plane(surface)))?
            .uv?;
        let point = uv_to_canvas(uv, size);
        if self.modes.snap_to_grid() {
            Some(snap_to_grid(point, self.grid_size))
        } else {
            Some(point)
        }
    }

    fn route_resize(
        &mut self,
        event: &PointerEvent,
        scene: &mut Scene,
        host: &dyn SceneHost,
    ) -> RouteOutcome {
        let Some(surface) = scene.active_id() else {
            tracing::debug!("Resize ignored: no surface");
            return RouteOutcome::Ignored;
        };

        match event.phase {
            GesturePhase::Down => {
                let hits = host.hit_test(scene, event.position, HitFilter::Handles);
                match self
                    .resize
                    .begin(surface, hits.into_iter().filter_map(|hit| hit.object))
                {
                    Some(handle) => {
                        tracing::debug!("Grabbed {handle}");
                        RouteOutcome::HandleGrabbed(handle)
                    }
                    None => RouteOutcome::Ignored,
                }
            }
            _ => {
                let Some(handle) = self.resize.active() else {
                    return RouteOutcome::Ignored;
                };
                let Some(hit) = host
                    .hit_test(scene, event.position, HitFilter::Planes)
                    .into_iter()
                    .next()
                else {
                    return RouteOutcome::Ignored;
                };
                let Some(surface) = scene.get_mut(surface) else {
                    return RouteOutcome::Ignored;
                };
                match self.resize.update(&mut surface.geometry, hit.world) {
                    Some((width, height)) => RouteOutcome::Resized {
                        handle,
                        width,
                        height,
                    },
                    None => RouteOutcome::Ignored,
                }
            }
        }
    }

    fn route_rotate(event: &PointerEvent, scene: &mut Scene) -> RouteOutcome {
        if event.phase != GesturePhase::Move {
            return RouteOutcome::Ignored;
        }
        let Some(surface) = scene.active_surface_mut() else {
            tracing::debug!("Rotate ignored: no surface");
            return RouteOutcome::Ignored;
        };
        let (yaw, pitch) = surface.geometry.rotate(event.delta.x, event.delta.y);
        RouteOutcome::Rotated { yaw, pitch }
    }
}
