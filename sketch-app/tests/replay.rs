//! Replay driver tests: script file in, PNG out.

use std::sync::Arc;

use async_trait::async_trait;
use sketch_app::{replay, Notice, ReplayConfig, SessionError};
use sketch_vision::{DescribeSketch, DescriptionResult};

struct EchoDescriber;

#[async_trait]
impl DescribeSketch for EchoDescriber {
    async fn describe(&self, jpeg: &[u8]) -> DescriptionResult<String> {
        Ok(format!("{} bytes of sketch", jpeg.len()))
    }
}

const DRAWING: &str = r#"{
    "steps": [
        { "action": "add_surface" },
        { "action": "background", "color": "cream" },
        { "action": "pen", "color": "blue" },
        { "action": "stroke", "points": [[560, 360], [600, 340], [640, 360], [680, 380], [720, 360]] },
        { "action": "set_mode", "mode": "rotate", "enabled": true },
        { "action": "stroke", "points": [[640, 360], [650, 360]] },
        { "action": "set_mode", "mode": "rotate", "enabled": false }
    ]
}"#;

fn write_script(dir: &tempfile::TempDir, json: &str) -> std::path::PathBuf {
    let path = dir.path().join("script.json");
    std::fs::write(&path, json).expect("write script");
    path
}

#[tokio::test]
async fn replay_writes_final_canvas() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_script(&dir, DRAWING);
    let output = dir.path().join("out.png");

    let outcome = replay(&ReplayConfig::new(&script, &output), None)
        .await
        .expect("replay");

    assert_eq!(outcome.report.steps, 7);
    assert_eq!(outcome.report.painted, 4);
    assert_eq!(outcome.report.rotated, 1);
    assert!(outcome.notices.is_empty());
    assert_eq!(outcome.output.as_deref(), Some(output.as_path()));

    let image = image::open(&output).expect("decode png").to_rgba8();
    assert_eq!(image.dimensions(), (512, 512));
    assert_eq!(image.get_pixel(5, 5).0, [255, 247, 224, 255]);
    let blue = image
        .pixels()
        .any(|p| p.0[2] > 200 && p.0[0] < 80 && p.0[1] < 80);
    assert!(blue, "stroke missing from output");
}

#[tokio::test]
async fn replay_without_surface_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_script(
        &dir,
        r#"{ "steps": [{ "action": "stroke", "points": [[1, 1], [2, 2]] }] }"#,
    );
    let output = dir.path().join("out.png");

    let outcome = replay(&ReplayConfig::new(&script, &output), None)
        .await
        .expect("replay");
    assert!(outcome.output.is_none());
    assert_eq!(outcome.report.ignored, 2);
    assert!(!output.exists());
}

#[tokio::test]
async fn replay_describes_final_canvas() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_script(&dir, DRAWING);
    let mut config = ReplayConfig::new(&script, dir.path().join("out.png"));
    config.describe = true;

    let outcome = replay(&config, Some(Arc::new(EchoDescriber)))
        .await
        .expect("replay");
    assert_eq!(outcome.report.descriptions, 1);
    assert!(matches!(
        &outcome.notices[..],
        [Notice::Description { stale: false, text }] if text.ends_with("bytes of sketch")
    ));
}

#[tokio::test]
async fn replay_rejects_malformed_script() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_script(&dir, r#"{ "steps": [{ "action": "teleport" }] }"#);
    let err = replay(&ReplayConfig::new(&script, dir.path().join("out.png")), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Script(_)));
}

#[test]
fn vision_config_requires_key() {
    let config = ReplayConfig::new("script.json", "out.png");
    assert!(matches!(
        config.vision_config(),
        Err(SessionError::Description(_))
    ));
}
