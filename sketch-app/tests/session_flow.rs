//! Session Integration Tests
//!
//! Drives a `SketchSession` through the simulated host the way a device
//! session would: placement, drawing, manipulation and descriptions.

use std::f32::consts::PI;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use glam::{Vec2, Vec3};
use sketch_app::{DetectedPlane, Notice, SessionConfig, SessionError, SimulatedHost, SketchSession};
use sketch_core::{
    AnchorId, BackgroundColor, GesturePhase, HandleId, InteractionMode, ModeToggle, ObjectId,
    PenColor, PlaneAnchor, PointerEvent, RouteOutcome, SurfaceId,
};
use sketch_vision::{DescribeSketch, DescriptionError, DescriptionResult};

// ============================================================================
// Helpers
// ============================================================================

/// Describer double that records every snapshot it receives.
struct FakeDescriber {
    reply: Result<String, String>,
    received: Mutex<Vec<Vec<u8>>>,
}

impl FakeDescriber {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            received: Mutex::new(Vec::new()),
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(reason.to_string()),
            received: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl DescribeSketch for FakeDescriber {
    async fn describe(&self, jpeg: &[u8]) -> DescriptionResult<String> {
        self.received.lock().unwrap().push(jpeg.to_vec());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(reason) => Err(DescriptionError::Decode(reason.clone())),
        }
    }
}

/// Describer whose task dies before answering.
struct PanickingDescriber;

#[async_trait]
impl DescribeSketch for PanickingDescriber {
    async fn describe(&self, _jpeg: &[u8]) -> DescriptionResult<String> {
        panic!("describer crashed");
    }
}

fn session_with_surface() -> (SketchSession<SimulatedHost>, SurfaceId) {
    let mut session = SketchSession::new(SimulatedHost::default(), SessionConfig::default());
    let id = session
        .add_surface()
        .expect("placement")
        .expect("surface placed");
    (session, id)
}

fn stroke(session: &mut SketchSession<SimulatedHost>, points: &[(f32, f32)]) -> Vec<RouteOutcome> {
    let mut outcomes = Vec::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        let phase = if i == 0 {
            GesturePhase::Down
        } else {
            GesturePhase::Move
        };
        outcomes.push(
            session
                .handle_pointer(&PointerEvent::pan(phase, x, y))
                .expect("pointer"),
        );
    }
    if let Some(&(x, y)) = points.last() {
        outcomes.push(
            session
                .handle_pointer(&PointerEvent::pan(GesturePhase::Up, x, y))
                .expect("pointer"),
        );
    }
    outcomes
}

fn dark_pixels(
    session: &SketchSession<SimulatedHost>,
    x: std::ops::Range<u32>,
    y: std::ops::Range<u32>,
) -> usize {
    let canvas = session.canvas().expect("canvas");
    x.flat_map(|px| y.clone().map(move |py| (px, py)))
        .filter_map(|(px, py)| canvas.pixel(px, py))
        .filter(|p| p.r < 128 && p.g < 128 && p.b < 128)
        .count()
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn manual_placement_faces_the_camera() {
    let (session, id) = session_with_surface();
    let surface = session.scene().get(id).expect("surface");
    assert!((surface.geometry.position - Vec3::new(0.0, 0.0, -0.5)).length() < 1e-4);
    assert!((surface.geometry.orientation.y - 2.0 * PI).abs() < 1e-5);
    assert!(surface.anchor.is_none());
    assert!(session.host().material(ObjectId::Plane(id)).is_some());
}

#[test]
fn manual_placement_prefers_plane_under_center() {
    let mut host = SimulatedHost::default();
    host.add_plane(DetectedPlane {
        anchor: PlaneAnchor {
            id: AnchorId("wall".into()),
            center: Vec3::new(0.0, 0.0, -1.0),
        },
        normal: Vec3::Z,
    });
    let mut session = SketchSession::new(host, SessionConfig::default());
    let id = session.add_surface().unwrap().unwrap();
    let geometry = &session.scene().get(id).unwrap().geometry;
    assert!((geometry.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    assert_eq!(geometry.orientation, Vec3::ZERO);
}

#[test]
fn second_manual_placement_is_ignored() {
    let (mut session, _) = session_with_surface();
    assert!(session.add_surface().unwrap().is_none());
    assert_eq!(session.scene().surface_count(), 1);
}

#[test]
fn placement_waits_for_tracking() {
    let host = SimulatedHost::default().without_tracking();
    let mut session = SketchSession::new(host, SessionConfig::default());
    assert!(session.add_surface().unwrap().is_none());
    assert!(session.scene().is_empty());
}

#[test]
fn removing_last_surface_drops_canvas() {
    let (mut session, id) = session_with_surface();
    let generation = session.generation();
    assert_eq!(session.remove_active_surface().unwrap(), Some(id));
    assert!(session.scene().is_empty());
    assert!(session.canvas().is_none());
    assert_eq!(session.generation(), generation + 1);
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn stroke_through_center_inks_canvas_center() {
    let (mut session, id) = session_with_surface();
    let updates = session.host().material_updates();

    let outcomes = stroke(&mut session, &[(600.0, 360.0), (640.0, 360.0), (680.0, 360.0)]);
    let painted = outcomes.iter().filter(|o| o.painted()).count();
    assert_eq!(painted, 2);
    assert_eq!(outcomes.last(), Some(&RouteOutcome::Ended));

    // Each painted segment republishes the surface material.
    assert_eq!(session.host().material_updates(), updates + 2);
    assert!(session.host().material(ObjectId::Plane(id)).is_some());

    assert!(dark_pixels(&session, 240..272, 250..262) > 0);
    assert_eq!(dark_pixels(&session, 0..64, 0..64), 0);
}

#[test]
fn pen_color_applies_to_later_strokes() {
    let (mut session, _) = session_with_surface();
    session.set_pen_color(PenColor::Red);
    stroke(&mut session, &[(600.0, 360.0), (640.0, 360.0), (680.0, 360.0)]);

    let canvas = session.canvas().unwrap();
    let red = (240..272)
        .flat_map(|x| (250..262).map(move |y| (x, y)))
        .filter_map(|(x, y)| canvas.pixel(x, y))
        .any(|p| p.r > 200 && p.g < 80 && p.b < 80);
    assert!(red);
}

#[test]
fn snapped_stroke_starts_on_grid() {
    let (mut session, _) = session_with_surface();
    assert!(session.toggle_snap_to_grid().snap_active);
    let outcome = session
        .handle_pointer(&PointerEvent::pan(GesturePhase::Down, 610.0, 350.0))
        .unwrap();
    let RouteOutcome::StrokeStarted(point) = outcome else {
        panic!("expected stroke start, got {outcome:?}");
    };
    assert_eq!(point % 32.0, Vec2::ZERO);
}

#[test]
fn clear_and_background_blank_the_canvas() {
    let (mut session, _) = session_with_surface();
    stroke(&mut session, &[(600.0, 360.0), (640.0, 360.0), (680.0, 360.0)]);
    session.clear_canvas().unwrap();
    assert_eq!(dark_pixels(&session, 0..512, 240..272), 0);

    session.set_background_color(BackgroundColor::Cream).unwrap();
    assert_eq!(
        session.canvas().unwrap().pixel(256, 256),
        Some(BackgroundColor::Cream.rgba())
    );
}

#[test]
fn drawing_off_the_surface_is_ignored() {
    let (mut session, _) = session_with_surface();
    let outcomes = stroke(&mut session, &[(5.0, 5.0), (10.0, 10.0)]);
    assert_eq!(outcomes[0], RouteOutcome::Ignored);
    assert_eq!(outcomes[1], RouteOutcome::Ignored);
}

// ============================================================================
// Manipulation
// ============================================================================

#[test]
fn dragging_right_handle_resizes_width() {
    let (mut session, id) = session_with_surface();
    session.set_mode(ModeToggle::Resize, true);
    assert_eq!(session.mode(), InteractionMode::Resize);

    let handle = session
        .scene()
        .world_position(ObjectId::Handle(id, HandleId::Right))
        .unwrap();
    let grab = session.host().project(handle).unwrap();
    let outcome = session
        .handle_pointer(&PointerEvent::pan(GesturePhase::Down, grab.x, grab.y))
        .unwrap();
    assert_eq!(outcome, RouteOutcome::HandleGrabbed(HandleId::Right));

    let target = session.host().project(Vec3::new(0.3, 0.0, -0.5)).unwrap();
    let outcome = session
        .handle_pointer(&PointerEvent::pan(GesturePhase::Move, target.x, target.y))
        .unwrap();
    let RouteOutcome::Resized { width, height, .. } = outcome else {
        panic!("expected resize, got {outcome:?}");
    };
    assert!((width - 0.6).abs() < 1e-3);
    assert!((height - 0.5).abs() < 1e-6);

    let geometry = &session.scene().get(id).unwrap().geometry;
    assert!((geometry.handle_offset(HandleId::Right).x - 0.3).abs() < 1e-3);
    assert!((geometry.handle_offset(HandleId::Left).x + 0.3).abs() < 1e-3);
}

#[test]
fn long_press_resizes_while_drawing() {
    let (mut session, id) = session_with_surface();
    assert_eq!(session.mode(), InteractionMode::Draw);

    let handle = session
        .scene()
        .world_position(ObjectId::Handle(id, HandleId::Top))
        .unwrap();
    let grab = session.host().project(handle).unwrap();
    let outcome = session
        .handle_pointer(&PointerEvent::long_press(GesturePhase::Down, grab.x, grab.y))
        .unwrap();
    assert_eq!(outcome, RouteOutcome::HandleGrabbed(HandleId::Top));

    let target = session.host().project(Vec3::new(0.0, 0.01, -0.5)).unwrap();
    let outcome = session
        .handle_pointer(&PointerEvent::long_press(GesturePhase::Move, target.x, target.y))
        .unwrap();
    let RouteOutcome::Resized { height, .. } = outcome else {
        panic!("expected resize, got {outcome:?}");
    };
    assert!((height - 0.1).abs() < 1e-6, "height clamps to the minimum");
}

#[test]
fn rotate_mode_turns_the_surface() {
    let (mut session, id) = session_with_surface();
    session.set_mode(ModeToggle::Rotate, true);
    let before = session.scene().get(id).unwrap().geometry.orientation;

    session
        .handle_pointer(&PointerEvent::pan(GesturePhase::Down, 640.0, 360.0))
        .unwrap();
    let outcome = session
        .handle_pointer(&PointerEvent::pan(GesturePhase::Move, 670.0, 375.0).with_delta(30.0, 15.0))
        .unwrap();
    assert!(matches!(outcome, RouteOutcome::Rotated { .. }));

    let after = session.scene().get(id).unwrap().geometry.orientation;
    assert!((after.y - before.y + 0.1).abs() < 1e-5);
    assert!((after.x - before.x + 0.05).abs() < 1e-5);
    assert!(session.canvas().is_some());
}

// ============================================================================
// Descriptions
// ============================================================================

#[tokio::test]
async fn description_is_delivered_on_poll() {
    let describer = FakeDescriber::answering("A smiling sun.");
    let (session, _) = session_with_surface();
    let mut session = session.with_describer(describer.clone());
    stroke(&mut session, &[(600.0, 360.0), (640.0, 360.0)]);

    session.request_description().unwrap();
    assert_eq!(session.pending_descriptions(), 1);
    let delivered = session.wait_descriptions().await;

    assert_eq!(
        delivered,
        vec![Notice::Description {
            text: "A smiling sun.".into(),
            stale: false
        }]
    );
    assert_eq!(session.pending_descriptions(), 0);
    assert_eq!(describer.calls(), 1);
    let jpeg = describer.received.lock().unwrap()[0].clone();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    assert_eq!(session.notices().count(), 1);
    assert!(session.dismiss_notice().is_some());
    assert_eq!(session.notices().count(), 0);
}

#[tokio::test]
async fn result_for_replaced_canvas_is_stale() {
    let (session, _) = session_with_surface();
    let mut session = session.with_describer(FakeDescriber::answering("old drawing"));

    session.request_description().unwrap();
    session.clear_canvas().unwrap();
    let delivered = session.wait_descriptions().await;

    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].is_stale());
    assert_eq!(delivered[0].message(), "old drawing");
}

#[tokio::test]
async fn failed_description_becomes_notice_without_retry() {
    let describer = FakeDescriber::failing("no candidates");
    let (session, _) = session_with_surface();
    let mut session = session.with_describer(describer.clone());

    session.request_description().unwrap();
    let delivered = session.wait_descriptions().await;

    assert_eq!(describer.calls(), 1);
    assert!(matches!(
        &delivered[..],
        [Notice::DescriptionFailed { stale: false, .. }]
    ));
    assert!(delivered[0].message().contains("no candidates"));
}

#[tokio::test]
async fn crashed_description_task_is_reported() {
    let (session, _) = session_with_surface();
    let mut session = session.with_describer(Arc::new(PanickingDescriber));

    session.request_description().unwrap();
    let delivered = tokio::time::timeout(Duration::from_secs(5), session.wait_descriptions())
        .await
        .expect("wait for a crashed task must finish");

    assert_eq!(session.pending_descriptions(), 0);
    assert!(matches!(
        &delivered[..],
        [Notice::DescriptionFailed { stale: false, .. }]
    ));
    assert!(delivered[0].message().starts_with("description task failed"));
    assert_eq!(session.notices().count(), 1);
}

#[tokio::test]
async fn describe_requires_a_canvas() {
    let mut session = SketchSession::new(SimulatedHost::default(), SessionConfig::default())
        .with_describer(FakeDescriber::answering("unused"));
    assert!(matches!(
        session.request_description(),
        Err(SessionError::NoCanvas)
    ));
}

#[test]
fn describe_requires_a_runtime() {
    let (session, _) = session_with_surface();
    let mut session = session.with_describer(FakeDescriber::answering("unused"));
    assert!(matches!(
        session.request_description(),
        Err(SessionError::NoRuntime)
    ));
}
