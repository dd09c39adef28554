//! # Sketch Surface Vision
//!
//! Sends a JPEG snapshot of the canvas to a generative vision model and
//! returns its text description.
//!
//! The key is resolved at startup through [`VisionConfig`] and never
//! compiled in. Callers depend on the [`DescribeSketch`] trait so tests can
//! swap in a double.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;

pub use client::{parse_description, DescribeSketch, DescriptionClient};
pub use config::VisionConfig;
pub use error::{DescriptionError, DescriptionResult};
