//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Inference API reported a failure
    #[error("Inference error: {message}")]
    InferenceError {
        message: String,
    },

    /// Remote model did not finish loading within the retry budget
    #[error("Model {model} is still loading after {attempts} attempts")]
    ModelLoading {
        model: String,
        attempts: u32,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Tokenizer could not be loaded or applied
    #[error("Tokenizer error: {message}")]
    TokenizerError {
        message: String,
    },

    /// Local model files could not be found or loaded
    #[cfg(feature = "local")]
    #[error("Model error: {message}")]
    ModelError {
        message: String,
    },

    /// Local inference failed
    #[cfg(feature = "local")]
    #[error("Inference error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
