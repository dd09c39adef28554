//! JSON replay scripts.
//!
//! A script is a list of toolbar actions and pointer input played against a
//! [`SketchSession`] backed by the [`SimulatedHost`]:
//!
//! ```json
//! {
//!   "steps": [
//!     { "action": "add_surface" },
//!     { "action": "pen", "color": "red" },
//!     { "action": "stroke", "points": [[600, 340], [640, 360], [680, 350]] },
//!     { "action": "describe" }
//!   ]
//! }
//! ```

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use sketch_core::{
    AnchorId, BackgroundColor, GesturePhase, InputChannel, ModeToggle, PenColor, PlaneAnchor,
    PointerEvent, RouteOutcome,
};

use crate::error::SessionResult;
use crate::session::{SessionConfig, SketchSession};
use crate::sim::{camera_at, DetectedPlane, SimulatedHost};

fn default_up() -> Vec3 {
    Vec3::Y
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// The tracker finds a plane.
    DetectPlane {
        /// Anchor identifier.
        id: String,
        /// Plane center in world space.
        center: Vec3,
        /// Plane normal; horizontal when omitted.
        #[serde(default = "default_up")]
        normal: Vec3,
    },
    /// Move the camera.
    Camera {
        /// World-space position.
        position: Vec3,
        /// Yaw in radians; π looks along −Z.
        yaw: f32,
    },
    /// Place a surface by hand.
    AddSurface,
    /// Remove every surface.
    DeleteAll,
    /// Remove the active surface.
    RemoveSurface,
    /// Blank the canvas.
    ClearCanvas,
    /// Pick a pen color.
    Pen {
        /// Palette entry.
        color: PenColor,
    },
    /// Pick a background color.
    Background {
        /// Palette entry.
        color: BackgroundColor,
    },
    /// Switch resize or rotate mode.
    SetMode {
        /// Which toggle.
        mode: ModeToggle,
        /// On or off.
        enabled: bool,
    },
    /// Flip grid snapping.
    ToggleSnap,
    /// A raw pointer event.
    Pointer(PointerEvent),
    /// A whole gesture: down at the first point, moves, up at the last.
    Stroke {
        /// Screen points in order.
        points: Vec<Vec2>,
        /// Recognizer to deliver through.
        #[serde(default)]
        channel: InputChannel,
    },
    /// Ask for a description of the canvas.
    Describe,
}

/// A replay script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Session tunables.
    #[serde(default)]
    pub session: SessionConfig,
    /// Actions in order.
    pub steps: Vec<Step>,
}

/// Tally of what a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Steps executed.
    pub steps: usize,
    /// Pointer events delivered.
    pub events: usize,
    /// Segments painted.
    pub painted: usize,
    /// Resize updates applied.
    pub resized: usize,
    /// Rotation updates applied.
    pub rotated: usize,
    /// Pointer events that had no effect.
    pub ignored: usize,
    /// Description requests sent.
    pub descriptions: usize,
}

impl ReplayReport {
    fn record(&mut self, outcome: RouteOutcome) {
        self.events += 1;
        match outcome {
            RouteOutcome::Painted(_) => self.painted += 1,
            RouteOutcome::Resized { .. } => self.resized += 1,
            RouteOutcome::Rotated { .. } => self.rotated += 1,
            RouteOutcome::Ignored => self.ignored += 1,
            RouteOutcome::StrokeStarted(_)
            | RouteOutcome::HandleGrabbed(_)
            | RouteOutcome::Ended => {}
        }
    }
}

impl ReplayScript {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json(json: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> SessionResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Play every step against `session`.
    ///
    /// # Errors
    ///
    /// Stops at the first step whose session operation fails.
    pub fn run(&self, session: &mut SketchSession<SimulatedHost>) -> SessionResult<ReplayReport> {
        let mut report = ReplayReport::default();
        for step in &self.steps {
            run_step(step, session, &mut report)?;
            report.steps += 1;
        }
        tracing::info!(
            steps = report.steps,
            painted = report.painted,
            resized = report.resized,
            rotated = report.rotated,
            "Replay finished"
        );
        Ok(report)
    }
}

fn run_step(
    step: &Step,
    session: &mut SketchSession<SimulatedHost>,
    report: &mut ReplayReport,
) -> SessionResult<()> {
    tracing::debug!("Step {step:?}");
    match step {
        Step::DetectPlane { id, center, normal } => {
            let anchor = PlaneAnchor {
                id: AnchorId(id.clone()),
                center: *center,
            };
            session.host_mut().add_plane(DetectedPlane {
                anchor: anchor.clone(),
                normal: normal.normalize_or_zero(),
            });
            session.on_plane_detected(&anchor)?;
        }
        Step::Camera { position, yaw } => {
            session
                .host_mut()
                .set_camera(Some(camera_at(*position, *yaw)));
        }
        Step::AddSurface => {
            session.add_surface()?;
        }
        Step::DeleteAll => {
            session.delete_all();
        }
        Step::RemoveSurface => {
            session.remove_active_surface()?;
        }
        Step::ClearCanvas => session.clear_canvas()?,
        Step::Pen { color } => session.set_pen_color(*color),
        Step::Background { color } => session.set_background_color(*color)?,
        Step::SetMode { mode, enabled } => {
            session.set_mode(*mode, *enabled);
        }
        Step::ToggleSnap => {
            session.toggle_snap_to_grid();
        }
        Step::Pointer(event) => report.record(session.handle_pointer(event)?),
        Step::Stroke { points, channel } => {
            for event in gesture(points, *channel) {
                report.record(session.handle_pointer(&event)?);
            }
        }
        Step::Describe => {
            if session.can_describe() {
                session.request_description()?;
                report.descriptions += 1;
            } else {
                tracing::warn!("Describe step skipped: no description service");
            }
        }
    }
    Ok(())
}

/// Expand a polyline into down, move and up events with per-event deltas.
fn gesture(points: &[Vec2], channel: InputChannel) -> Vec<PointerEvent> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };
    let mut events = vec![PointerEvent::new(GesturePhase::Down, first).on_channel(channel)];
    let mut previous = first;
    for &point in rest {
        let delta = point - previous;
        events.push(
            PointerEvent::new(GesturePhase::Move, point)
                .on_channel(channel)
                .with_delta(delta.x, delta.y),
        );
        previous = point;
    }
    events.push(PointerEvent::new(GesturePhase::Up, previous).on_channel(channel));
    events
}
