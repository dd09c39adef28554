//! Interaction mode selection.

use serde::{Deserialize, Serialize};

/// What a pan gesture does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Freehand drawing on the surface.
    #[default]
    Draw,
    /// Dragging edge handles to resize the surface.
    Resize,
    /// Dragging to rotate the surface.
    Rotate,
}

/// A mode that can be switched on and off from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeToggle {
    /// The dimension (resize) toggle.
    Resize,
    /// The rotation toggle.
    Rotate,
}

impl ModeToggle {
    const fn mode(self) -> InteractionMode {
        match self {
            Self::Resize => InteractionMode::Resize,
            Self::Rotate => InteractionMode::Rotate,
        }
    }
}

/// Which toolbar toggles should render as active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ControlState {
    /// Rotation toggle highlighted.
    pub rotate_active: bool,
    /// Dimension toggle highlighted.
    pub resize_active: bool,
    /// Snap-to-grid toggle highlighted.
    pub snap_active: bool,
}

/// Current mode plus the independent snap-to-grid flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    mode: InteractionMode,
    snap_to_grid: bool,
}

impl ModeState {
    /// Draw mode with snapping off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active interaction mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Whether drawing input is snapped to the grid.
    #[must_use]
    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    /// Enable or disable a toggleable mode.
    ///
    /// Enabling one of resize/rotate replaces the other. Disabling the
    /// active one falls back to drawing; disabling an inactive one does
    /// nothing.
    pub fn set_mode(&mut self, toggle: ModeToggle, enabled: bool) -> ControlState {
        let target = toggle.mode();
        if enabled {
            self.mode = target;
        } else if self.mode == target {
            self.mode = InteractionMode::Draw;
        }
        tracing::info!(
            "{:?} mode {}",
            toggle,
            if self.mode == target { "ON" } else { "OFF" }
        );
        self.controls()
    }

    /// Flip a toggleable mode.
    pub fn toggle(&mut self, toggle: ModeToggle) -> ControlState {
        let enabled = self.mode != toggle.mode();
        self.set_mode(toggle, enabled)
    }

    /// Enable or disable snap-to-grid. Leaves the mode untouched.
    pub fn set_snap_to_grid(&mut self, enabled: bool) -> ControlState {
        self.snap_to_grid = enabled;
        tracing::info!("Snap to grid {}", if enabled { "ON" } else { "OFF" });
        self.controls()
    }

    /// Flip snap-to-grid.
    pub fn toggle_snap_to_grid(&mut self) -> ControlState {
        self.set_snap_to_grid(!self.snap_to_grid)
    }

    /// Highlight state for the toolbar.
    #[must_use]
    pub fn controls(&self) -> ControlState {
        ControlState {
            rotate_active: self.mode == InteractionMode::Rotate,
            resize_active: self.mode == InteractionMode::Resize,
            snap_active: self.snap_to_grid,
        }
    }
}
