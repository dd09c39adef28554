//! Description service configuration parsed from environment variables.

use std::time::Duration;

use crate::error::{DescriptionError, DescriptionResult};

/// Variable holding the service API key.
pub const API_KEY_VAR: &str = "SKETCH_VISION_API_KEY";
/// Variable overriding the service base URL.
pub const BASE_URL_VAR: &str = "SKETCH_VISION_BASE_URL";
/// Variable overriding the model name.
pub const MODEL_VAR: &str = "SKETCH_VISION_MODEL";
/// Variable overriding the prompt sent with each snapshot.
pub const PROMPT_VAR: &str = "SKETCH_VISION_PROMPT";
/// Variable overriding the request timeout in seconds.
pub const TIMEOUT_VAR: &str = "SKETCH_VISION_TIMEOUT_SECS";

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Default prompt.
pub const DEFAULT_PROMPT: &str = "Describe this sketch.";
/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for [`DescriptionClient`](crate::DescriptionClient).
#[derive(Clone, PartialEq, Eq)]
pub struct VisionConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Model name used in the request path.
    pub model: String,
    /// Text part sent alongside the image.
    pub prompt: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("prompt", &self.prompt)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl VisionConfig {
    /// Config with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Override the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Build config from environment variables.
    ///
    /// Required:
    /// - `SKETCH_VISION_API_KEY`
    ///
    /// Optional:
    /// - `SKETCH_VISION_BASE_URL`: default [`DEFAULT_BASE_URL`]
    /// - `SKETCH_VISION_MODEL`: default [`DEFAULT_MODEL`]
    /// - `SKETCH_VISION_PROMPT`: default [`DEFAULT_PROMPT`]
    /// - `SKETCH_VISION_TIMEOUT_SECS`: default 60
    ///
    /// # Errors
    ///
    /// Returns [`DescriptionError::MissingApiKey`] when the key is unset or
    /// blank, and [`DescriptionError::Config`] for an unparsable timeout.
    pub fn from_env() -> DescriptionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`VisionConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> DescriptionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DescriptionError::MissingApiKey {
                var: API_KEY_VAR.into(),
            })?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config = config.with_base_url(&base_url);
        }
        if let Some(model) = lookup(MODEL_VAR) {
            config.model = model;
        }
        if let Some(prompt) = lookup(PROMPT_VAR) {
            config.prompt = prompt;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                DescriptionError::Config(format!("{TIMEOUT_VAR} is not a number: {raw}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
