//! # Sketch Replay
//!
//! Plays a scripted sketch session against the simulated AR host.

use std::sync::Arc;

use clap::Parser;
use sketch_app::{replay, CliArgs, Notice, ReplayConfig};
use sketch_vision::{DescribeSketch, DescriptionClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketch_app=info,sketch_core=info,sketch_vision=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = ReplayConfig::from(args);
    tracing::info!("Replaying {}", config.script.display());

    let describer: Option<Arc<dyn DescribeSketch>> = if config.describe {
        let vision = config.vision_config()?;
        tracing::debug!("Description service: {vision:?}");
        Some(Arc::new(DescriptionClient::new(&vision)?))
    } else {
        None
    };

    let outcome = replay(&config, describer).await?;
    tracing::info!(
        "{} steps, {} segments painted, {} resizes, {} rotations",
        outcome.report.steps,
        outcome.report.painted,
        outcome.report.resized,
        outcome.report.rotated
    );

    for notice in &outcome.notices {
        match notice {
            Notice::Description { text, stale } => {
                if *stale {
                    println!("(earlier canvas) {text}");
                } else {
                    println!("{text}");
                }
            }
            Notice::DescriptionFailed { message, .. } => {
                eprintln!("Description failed: {message}");
            }
        }
    }
    Ok(())
}
