//! Remote inference over the Hugging Face Inference API

use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};

/// A single generation returned by the inference API
#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    /// Translated text for one input
    pub translation_text: String,
}

/// Wire shape of an inference API reply
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    /// One generation per input, in input order
    Generations(Vec<Generation>),
    /// Error payload, e.g. while the model is still loading
    Failure { error: String },
}

/// Translation pipeline backed by the hosted inference API
#[derive(Debug, Clone)]
pub struct CloudPipeline {
    client: reqwest::Client,
    url: String,
    token: String,
    model: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl CloudPipeline {
    /// Create a pipeline for a specific model
    pub fn new(config: &TranslatorConfig, model: &str) -> Result<Self> {
        let token = config
            .api_token
            .clone()
            .ok_or_else(|| TranslationError::ConfigError {
                message: "Hugging Face token not found. Specify a token or set the \
                          HUGGINGFACE_TOKEN environment variable."
                    .to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/{}", config.api_endpoint.trim_end_matches('/'), model),
            token,
            model: model.to_string(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Translate a batch of inputs, one output per input
    ///
    /// A cold model answers with a "currently loading" error; those replies are
    /// retried with `wait_for_model` set, up to the configured retry budget.
    pub async fn generate(&self, inputs: &[String]) -> Result<Vec<String>> {
        let mut wait_for_model = false;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                sleep(self.retry_delay).await;
            }

            match self.send(inputs, wait_for_model).await? {
                ApiResponse::Generations(generations) => {
                    if attempt > 0 {
                        debug!("Model {} answered after {} retries", self.model, attempt);
                    }
                    return Ok(generations
                        .into_iter()
                        .map(|g| g.translation_text)
                        .collect());
                }
                ApiResponse::Failure { error } if error.contains("currently loading") => {
                    warn!("Model {} is still loading, retrying: {}", self.model, error);
                    wait_for_model = true;
                }
                ApiResponse::Failure { error } => {
                    return Err(TranslationError::InferenceError { message: error });
                }
            }
        }

        Err(TranslationError::ModelLoading {
            model: self.model.clone(),
            attempts: self.max_retries,
        })
    }

    /// Send one request and parse the reply
    async fn send(&self, inputs: &[String], wait_for_model: bool) -> Result<ApiResponse> {
        let body = serde_json::json!({
            "inputs": inputs,
            "wait_for_model": wait_for_model,
        });

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();

        // 503 carries the "currently loading" error payload
        if status.is_success() || status.as_u16() == 503 {
            response
                .json::<ApiResponse>()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })
        } else {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(TranslationError::ApiError {
                status: status_code,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Backend;

    fn cloud_config() -> TranslatorConfig {
        TranslatorConfig {
            backend: Backend::Cloud,
            api_token: Some("hf_test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_building() {
        let mut config = cloud_config();
        config.api_endpoint = "https://api-inference.huggingface.co/models/".to_string();

        let pipeline = CloudPipeline::new(&config, "shhossain/opus-mt-en-to-bn").unwrap();
        assert_eq!(
            pipeline.url,
            "https://api-inference.huggingface.co/models/shhossain/opus-mt-en-to-bn"
        );
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut config = cloud_config();
        config.api_token = None;
        assert!(CloudPipeline::new(&config, "shhossain/opus-mt-en-to-bn").is_err());
    }

    #[test]
    fn test_parse_generations() {
        let raw = r#"[{"translation_text": "হ্যালো বিশ্ব!"}, {"translation_text": "তুমি কে?"}]"#;
        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        match parsed {
            ApiResponse::Generations(gens) => {
                assert_eq!(gens.len(), 2);
                assert_eq!(gens[0].translation_text, "হ্যালো বিশ্ব!");
            }
            ApiResponse::Failure { .. } => panic!("expected generations"),
        }
    }

    #[test]
    fn test_parse_loading_error() {
        let raw = r#"{"error": "Model shhossain/opus-mt-en-to-bn is currently loading", "estimated_time": 20.0}"#;
        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        match parsed {
            ApiResponse::Failure { error } => assert!(error.contains("currently loading")),
            ApiResponse::Generations(_) => panic!("expected failure"),
        }
    }
}
