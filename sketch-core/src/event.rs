//! Pointer input delivered by the host's gesture recognizers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Phase of a continuous gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Finger down.
    Down,
    /// Finger dragging.
    Move,
    /// Finger lifted.
    Up,
    /// Gesture cancelled by the system.
    Cancel,
}

impl GesturePhase {
    /// Whether this phase ends the gesture.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Up | Self::Cancel)
    }
}

/// The recognizer a gesture arrived through.
///
/// Both channels can drive a resize: `Pan` only while resize mode is active,
/// `LongPress` always.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputChannel {
    /// Single-finger pan, routed by the current interaction mode.
    #[default]
    Pan,
    /// Press-and-hold then drag, dedicated to edge resizing.
    LongPress,
}

/// A single pointer update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Recognizer that produced the event.
    #[serde(default)]
    pub channel: InputChannel,
    /// Phase of the gesture.
    pub phase: GesturePhase,
    /// Pointer location in screen points.
    pub position: Vec2,
    /// Translation since the previous event of this gesture.
    ///
    /// The router consumes it once; hosts that report cumulative
    /// translation must reset it after each delivery.
    #[serde(default)]
    pub delta: Vec2,
}

impl PointerEvent {
    /// Create a pan event with no delta.
    #[must_use]
    pub fn new(phase: GesturePhase, position: Vec2) -> Self {
        Self {
            channel: InputChannel::Pan,
            phase,
            position,
            delta: Vec2::ZERO,
        }
    }

    /// Pan event at `(x, y)`.
    #[must_use]
    pub fn pan(phase: GesturePhase, x: f32, y: f32) -> Self {
        Self::new(phase, Vec2::new(x, y))
    }

    /// Long-press event at `(x, y)`.
    #[must_use]
    pub fn long_press(phase: GesturePhase, x: f32, y: f32) -> Self {
        Self::new(phase, Vec2::new(x, y)).on_channel(InputChannel::LongPress)
    }

    /// Set the input channel.
    #[must_use]
    pub fn on_channel(mut self, channel: InputChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Set the translation since the previous event.
    #[must_use]
    pub fn with_delta(mut self, dx: f32, dy: f32) -> Self {
        self.delta = Vec2::new(dx, dy);
        self
    }
}
