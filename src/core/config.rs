//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Language, LanguagePair};

/// Default endpoint of the Hugging Face Inference API
pub const DEFAULT_API_ENDPOINT: &str = "https://api-inference.huggingface.co/models";

/// Position budget assumed when nothing better is known
pub const FALLBACK_MAX_LENGTH: usize = 128;

/// Default model per language pair
const DEFAULT_MODELS: &[(&str, &str)] = &[
    ("en-bn", "shhossain/opus-mt-en-to-bn"),
    ("bn-en", "Helsinki-NLP/opus-mt-bn-en"),
];

/// Known `max_position_embeddings` for models whose hosted config is not consulted
const MODEL_MAX_LENGTHS: &[(&str, usize)] = &[
    ("shhossain/opus-mt-en-to-bn", 128),
    ("Helsinki-NLP/opus-mt-bn-en", 512),
];

/// Inference backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Pretrained model executed in-process
    Local,
    /// Hugging Face Inference API
    Cloud,
}

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Source language
    pub src: Language,
    /// Destination language
    pub dest: Language,
    /// Model override; the pair's default model is used when unset
    pub model: Option<String>,
    /// Token budget override; the model's own budget is used when unset
    pub max_length: Option<usize>,
    /// Which backend runs the model
    pub backend: Backend,
    /// Hugging Face API token for the cloud backend
    pub api_token: Option<String>,
    /// Base URL of the inference API
    pub api_endpoint: String,
    /// Directory holding local model files; fetched from the hub when unset
    pub model_dir: Option<PathBuf>,
    /// Tokenizer JSON file used for token counting
    pub tokenizer_file: Option<PathBuf>,
    /// Delimiter used to join sentence-level translations
    pub delimiter: String,
    /// Maximum retries while a remote model is loading
    pub max_retries: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
    /// HTTP request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            src: Language::En,
            dest: Language::Bn,
            model: None,
            max_length: None,
            backend: Backend::Local,
            api_token: std::env::var("HUGGINGFACE_TOKEN").ok(),
            api_endpoint: std::env::var("HF_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_API_ENDPOINT.to_string()),
            model_dir: std::env::var("BNTRANS_MODEL_DIR").ok().map(PathBuf::from),
            tokenizer_file: None,
            delimiter: "\n".to_string(),
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_ms: 30000,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let max_retries = std::env::var("MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()?;

        let retry_delay_ms = std::env::var("RETRY_DELAY_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()?;

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        Ok(Self {
            max_retries,
            retry_delay_ms,
            timeout_ms,
            ..Self::default()
        })
    }

    /// Language pair being translated
    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.src, self.dest)
    }

    /// Resolve the model id for the configured language pair
    pub fn resolve_model(&self) -> Result<String> {
        if let Some(model) = &self.model {
            return Ok(model.clone());
        }

        let key = self.pair().to_string();
        DEFAULT_MODELS
            .iter()
            .find(|(pair, _)| *pair == key)
            .map(|(_, model)| model.to_string())
            .ok_or_else(|| TranslationError::ConfigError {
                message: format!("No default model for {key}. Please specify a model."),
            })
    }

    /// Resolve the token budget for a model
    ///
    /// Precedence: explicit override, bundled table, budget discovered from the
    /// model's own config, then [`FALLBACK_MAX_LENGTH`] with a warning.
    pub fn resolve_max_length(&self, model: &str, discovered: Option<usize>) -> usize {
        if let Some(len) = self.max_length {
            return len;
        }

        if let Some((_, len)) = MODEL_MAX_LENGTHS.iter().find(|(id, _)| *id == model) {
            return *len;
        }

        if let Some(len) = discovered {
            return len;
        }

        warn!(
            "Max length for {} is unknown, assuming {}. Specify max_length to silence this warning.",
            model, FALLBACK_MAX_LENGTH
        );
        FALLBACK_MAX_LENGTH
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.backend == Backend::Cloud && self.api_token.is_none() {
            return Err(TranslationError::ConfigError {
                message: "Hugging Face token not found. Specify a token or set the \
                          HUGGINGFACE_TOKEN environment variable."
                    .to_string(),
            });
        }

        if self.api_endpoint.is_empty() {
            return Err(TranslationError::ConfigError {
                message: "API endpoint is required".to_string(),
            });
        }

        if self.max_length == Some(0) {
            return Err(TranslationError::ConfigError {
                message: "max_length must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_resolution() {
        let config = TranslatorConfig::default();
        assert_eq!(config.resolve_model().unwrap(), "shhossain/opus-mt-en-to-bn");

        let config = TranslatorConfig {
            src: Language::Bn,
            dest: Language::En,
            ..Default::default()
        };
        assert_eq!(config.resolve_model().unwrap(), "Helsinki-NLP/opus-mt-bn-en");
    }

    #[test]
    fn test_model_override() {
        let config = TranslatorConfig {
            model: Some("Helsinki-NLP/opus-mt-en-hi".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_model().unwrap(), "Helsinki-NLP/opus-mt-en-hi");
    }

    #[test]
    fn test_missing_pair_needs_explicit_model() {
        let config = TranslatorConfig {
            src: Language::En,
            dest: Language::En,
            ..Default::default()
        };
        assert!(config.resolve_model().is_err());
    }

    #[test]
    fn test_max_length_resolution() {
        let config = TranslatorConfig::default();
        assert_eq!(config.resolve_max_length("shhossain/opus-mt-en-to-bn", None), 128);
        assert_eq!(config.resolve_max_length("Helsinki-NLP/opus-mt-bn-en", None), 512);

        // Unknown model falls back to the discovered budget, then the default
        assert_eq!(config.resolve_max_length("some/other-model", Some(256)), 256);
        assert_eq!(
            config.resolve_max_length("some/other-model", None),
            FALLBACK_MAX_LENGTH
        );
    }

    #[test]
    fn test_max_length_override_wins() {
        let config = TranslatorConfig {
            max_length: Some(64),
            ..Default::default()
        };
        assert_eq!(config.resolve_max_length("shhossain/opus-mt-en-to-bn", Some(512)), 64);
    }

    #[test]
    fn test_cloud_requires_token() {
        let config = TranslatorConfig {
            backend: Backend::Cloud,
            api_token: None,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TranslatorConfig {
            backend: Backend::Cloud,
            api_token: Some("hf_test".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_length_rejected() {
        let config = TranslatorConfig {
            max_length: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
