//! Configuration for the extraction call.
//!
//! Every knob lives in [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. Keeping the whole request shape in one struct
//! makes it trivial to share a config across calls and to point the client at
//! a stub endpoint in tests.

use crate::error::FichaError;
use std::fmt;

/// Default chat-completion endpoint base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default vision model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Configuration for a packaging-photo extraction.
///
/// Built via [`ExtractionConfig::builder()`] or [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use foto2ficha::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .api_key("sk-test")
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// API credential. Falls back to `OPENAI_API_KEY` when unset at build time.
    ///
    /// Treated as opaque: never logged, never persisted to disk by this crate.
    pub api_key: Option<String>,

    /// Base URL of the chat-completion endpoint. Default: [`DEFAULT_API_BASE`].
    ///
    /// Overridable so tests can point at a local stub and so OpenAI-compatible
    /// gateways (vLLM, LiteLLM, Ollama) can be used unchanged.
    pub api_base: String,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Maximum tokens the model may generate for the record. Default: 1500.
    ///
    /// A full label (nutrition table + ingredient text) fits comfortably in
    /// 1500 output tokens; setting this lower risks a truncated, unparseable
    /// JSON object.
    pub max_tokens: usize,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Transcription from a photo wants determinism, not creativity.
    pub temperature: f32,

    /// Per-call HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1500,
            temperature: 0.0,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The credential to use, consulting `OPENAI_API_KEY` when none was set
    /// explicitly. Empty strings count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        match &self.api_key {
            Some(k) if !k.trim().is_empty() => Some(k.clone()),
            _ => std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, FichaError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(FichaError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_base.trim().is_empty() {
            return Err(FichaError::InvalidConfig("api_base must not be empty".into()));
        }
        if c.model.trim().is_empty() {
            return Err(FichaError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}
