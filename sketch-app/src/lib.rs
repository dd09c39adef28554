//! # Sketch Surface App
//!
//! Interaction session for freehand drawing on AR surfaces, plus a simulated
//! AR host and a scripted replay driver.
//!
//! ## Usage
//!
//! ```bash
//! SKETCH_VISION_API_KEY=... cargo run -p sketch-app -- --script demo.json --describe
//! ```
//!
//! ## Architecture
//!
//! - `SketchSession` - surfaces, canvas, controls and description requests
//! - `SimulatedHost` - ray-cast `SceneHost` with a pinhole camera
//! - `ReplayScript` - JSON list of controls and pointer input
//! - `CliArgs` / `ReplayConfig` - command line parsed with clap, env fallbacks

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod error;
pub mod script;
pub mod session;
pub mod sim;

pub use error::{SessionError, SessionResult};
pub use script::{ReplayReport, ReplayScript, Step};
pub use session::{Notice, SessionConfig, SketchSession};
pub use sim::{DetectedPlane, SimulatedHost};

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sketch_vision::config::{API_KEY_VAR, BASE_URL_VAR, MODEL_VAR, PROMPT_VAR, TIMEOUT_VAR};
use sketch_vision::{DescribeSketch, VisionConfig};

/// Command-line arguments for sketch-replay.
#[derive(Debug, Clone, Parser)]
#[command(name = "sketch-replay")]
#[command(about = "Replay a scripted AR sketch session and export the canvas")]
#[command(version)]
pub struct CliArgs {
    /// JSON replay script
    #[arg(long)]
    pub script: PathBuf,

    /// Where to write the final canvas as PNG
    #[arg(long, default_value = "sketch.png")]
    pub output: PathBuf,

    /// Request a description of the final canvas
    #[arg(long)]
    pub describe: bool,

    /// Simulated viewport width in screen points
    #[arg(long, default_value = "1280")]
    pub viewport_width: f32,

    /// Simulated viewport height in screen points
    #[arg(long, default_value = "720")]
    pub viewport_height: f32,

    /// Vertical field of view in degrees
    #[arg(long, default_value = "60")]
    pub fov: f32,

    /// API key for the description service
    #[arg(long, env = "SKETCH_VISION_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Description service base URL
    #[arg(long, env = "SKETCH_VISION_BASE_URL")]
    pub vision_url: Option<String>,

    /// Vision model name
    #[arg(long, env = "SKETCH_VISION_MODEL")]
    pub model: Option<String>,

    /// Prompt sent with the snapshot
    #[arg(long, env = "SKETCH_VISION_PROMPT")]
    pub prompt: Option<String>,

    /// Description request timeout in seconds
    #[arg(long, env = "SKETCH_VISION_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Script to play.
    pub script: PathBuf,
    /// PNG destination.
    pub output: PathBuf,
    /// Whether to describe the final canvas.
    pub describe: bool,
    /// Viewport width in screen points.
    pub viewport_width: f32,
    /// Viewport height in screen points.
    pub viewport_height: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    api_key: Option<String>,
    vision_url: Option<String>,
    model: Option<String>,
    prompt: Option<String>,
    timeout_secs: Option<u64>,
}

impl ReplayConfig {
    /// Config for `script` with defaults and no description service.
    #[must_use]
    pub fn new(script: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            output: output.into(),
            describe: false,
            viewport_width: sim::DEFAULT_VIEWPORT_WIDTH,
            viewport_height: sim::DEFAULT_VIEWPORT_HEIGHT,
            fov_y: sim::DEFAULT_FOV_Y,
            api_key: None,
            vision_url: None,
            model: None,
            prompt: None,
            timeout_secs: None,
        }
    }

    /// Resolve the description service settings.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key was given or a value is invalid.
    pub fn vision_config(&self) -> SessionResult<VisionConfig> {
        Ok(VisionConfig::from_lookup(|var| match var {
            API_KEY_VAR => self.api_key.clone(),
            BASE_URL_VAR => self.vision_url.clone(),
            MODEL_VAR => self.model.clone(),
            PROMPT_VAR => self.prompt.clone(),
            TIMEOUT_VAR => self.timeout_secs.map(|secs| secs.to_string()),
            _ => None,
        })?)
    }
}

impl From<CliArgs> for ReplayConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            script: args.script,
            output: args.output,
            describe: args.describe,
            viewport_width: args.viewport_width,
            viewport_height: args.viewport_height,
            fov_y: args.fov.to_radians(),
            api_key: args.api_key,
            vision_url: args.vision_url,
            model: args.model,
            prompt: args.prompt,
            timeout_secs: args.timeout_secs,
        }
    }
}

/// Result of a replay run.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// What the script did.
    pub report: ReplayReport,
    /// Description notices delivered before exit.
    pub notices: Vec<Notice>,
    /// The PNG that was written, if a canvas existed.
    pub output: Option<PathBuf>,
}

/// Play a script, wait for descriptions and write the final canvas.
///
/// # Errors
///
/// Returns an error if the script cannot be loaded or played, or the PNG
/// cannot be written.
pub async fn replay(
    config: &ReplayConfig,
    describer: Option<Arc<dyn DescribeSketch>>,
) -> SessionResult<ReplayOutcome> {
    let script = ReplayScript::load(&config.script)?;
    let host = SimulatedHost::new(config.viewport_width, config.viewport_height)
        .with_fov(config.fov_y);
    let mut session = SketchSession::new(host, script.session);
    if let Some(describer) = describer {
        session = session.with_describer(describer);
    }

    let mut report = script.run(&mut session)?;
    if config.describe && session.can_describe() && session.canvas().is_some() {
        session.request_description()?;
        report.descriptions += 1;
    }
    let notices = session.wait_descriptions().await;

    let output = match session.canvas() {
        Some(canvas) => {
            std::fs::write(&config.output, canvas.snapshot()?)?;
            tracing::info!("Canvas written to {}", config.output.display());
            Some(config.output.clone())
        }
        None => {
            tracing::warn!("No canvas to write: the script never placed a surface");
            None
        }
    };

    Ok(ReplayOutcome {
        report,
        notices,
        output,
    })
}
