//! Local Marian inference via candle

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use candle_core::{Device, Tensor};
use candle_nn::{Activation, VarBuilder};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::marian::{self, MTModel};
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};

/// Source-side tokenizer file expected next to the weights
const SOURCE_TOKENIZER: &str = "tokenizer-source.json";
/// Target-side tokenizer file expected next to the weights
const TARGET_TOKENIZER: &str = "tokenizer-target.json";

/// Subset of a hosted `config.json` needed to build a Marian model
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    vocab_size: usize,
    #[serde(default)]
    decoder_vocab_size: Option<usize>,
    /// Token budget of the model
    pub max_position_embeddings: usize,
    encoder_layers: usize,
    encoder_ffn_dim: usize,
    encoder_attention_heads: usize,
    decoder_layers: usize,
    decoder_ffn_dim: usize,
    decoder_attention_heads: usize,
    d_model: usize,
    decoder_start_token_id: u32,
    pad_token_id: u32,
    eos_token_id: u32,
    #[serde(default)]
    forced_eos_token_id: Option<u32>,
    #[serde(default = "default_true")]
    scale_embedding: bool,
    #[serde(default = "default_true")]
    share_encoder_decoder_embeddings: bool,
}

fn default_true() -> bool {
    true
}

impl HubConfig {
    /// Load from a `config.json` file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Marian hyperparameters for candle
    fn to_marian(&self) -> marian::Config {
        marian::Config {
            vocab_size: self.vocab_size,
            decoder_vocab_size: self.decoder_vocab_size.or(Some(self.vocab_size)),
            max_position_embeddings: self.max_position_embeddings,
            encoder_layers: self.encoder_layers,
            encoder_ffn_dim: self.encoder_ffn_dim,
            encoder_attention_heads: self.encoder_attention_heads,
            decoder_layers: self.decoder_layers,
            decoder_ffn_dim: self.decoder_ffn_dim,
            decoder_attention_heads: self.decoder_attention_heads,
            use_cache: true,
            is_encoder_decoder: true,
            // Marian checkpoints all use swish
            activation_function: Activation::Swish,
            d_model: self.d_model,
            decoder_start_token_id: self.decoder_start_token_id,
            scale_embedding: self.scale_embedding,
            pad_token_id: self.pad_token_id,
            eos_token_id: self.eos_token_id,
            forced_eos_token_id: self.forced_eos_token_id.unwrap_or(self.eos_token_id),
            share_encoder_decoder_embeddings: self.share_encoder_decoder_embeddings,
        }
    }
}

/// Paths to everything a local model needs
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// Hosted `config.json`
    pub config: PathBuf,
    /// Safetensors weights
    pub weights: PathBuf,
    /// Tokenizer for the source language
    pub source_tokenizer: PathBuf,
    /// Tokenizer for the target language
    pub target_tokenizer: PathBuf,
}

impl ModelFiles {
    /// Expected layout inside a local model directory
    pub fn in_dir(dir: &Path) -> Result<Self> {
        let files = Self {
            config: dir.join("config.json"),
            weights: dir.join("model.safetensors"),
            source_tokenizer: dir.join(SOURCE_TOKENIZER),
            target_tokenizer: dir.join(TARGET_TOKENIZER),
        };

        for path in [
            &files.config,
            &files.weights,
            &files.source_tokenizer,
            &files.target_tokenizer,
        ] {
            if !path.is_file() {
                return Err(TranslationError::ModelError {
                    message: format!("Missing model file: {}", path.display()),
                });
            }
        }

        Ok(files)
    }

    /// Fetch the model files from the Hugging Face Hub
    pub fn fetch(model_id: &str) -> Result<Self> {
        let api = hf_hub::api::sync::Api::new().map_err(|e| TranslationError::ModelError {
            message: e.to_string(),
        })?;
        let repo = api.model(model_id.to_string());

        let get = |file: &str| {
            repo.get(file).map_err(|e| TranslationError::ModelError {
                message: format!("Failed to fetch {file} for {model_id}: {e}"),
            })
        };

        info!("Fetching {} from the Hugging Face Hub", model_id);
        Ok(Self {
            config: get("config.json")?,
            weights: get("model.safetensors")?,
            source_tokenizer: get(SOURCE_TOKENIZER)?,
            target_tokenizer: get(TARGET_TOKENIZER)?,
        })
    }
}

/// Model state shared with the blocking inference thread
struct LocalModel {
    model: MTModel,
    config: marian::Config,
    target_tokenizer: Tokenizer,
    device: Device,
}

/// Translation pipeline running a pretrained Marian model in-process
pub struct LocalPipeline {
    inner: Arc<Mutex<LocalModel>>,
    source_tokenizer: Tokenizer,
    max_position_embeddings: usize,
}

impl LocalPipeline {
    /// Load the model for a language pair, fetching files when needed
    pub fn load(config: &TranslatorConfig, model_id: &str) -> Result<Self> {
        let files = match &config.model_dir {
            Some(dir) => ModelFiles::in_dir(dir)?,
            None => ModelFiles::fetch(model_id)?,
        };

        let hub_config = HubConfig::from_file(&files.config)?;
        let marian_config = hub_config.to_marian();

        let source_tokenizer = load_tokenizer(&files.source_tokenizer)?;
        let target_tokenizer = load_tokenizer(&files.target_tokenizer)?;

        let device = Device::Cpu;
        let tensors = candle_core::safetensors::load(&files.weights, &device)?;
        let vb = VarBuilder::from_tensors(tensors, candle_core::DType::F32, &device);
        let model = MTModel::new(&marian_config, vb)?;

        info!(
            "Loaded {} ({} position budget)",
            model_id, hub_config.max_position_embeddings
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(LocalModel {
                model,
                config: marian_config,
                target_tokenizer,
                device,
            })),
            source_tokenizer,
            max_position_embeddings: hub_config.max_position_embeddings,
        })
    }

    /// Token budget reported by the model's own config
    pub fn max_position_embeddings(&self) -> usize {
        self.max_position_embeddings
    }

    /// Tokenizer matching the model's source vocabulary
    pub fn source_tokenizer(&self) -> Tokenizer {
        self.source_tokenizer.clone()
    }

    /// Translate a batch of inputs, one output per input
    pub async fn generate(&self, inputs: &[String]) -> Result<Vec<String>> {
        let inner = Arc::clone(&self.inner);
        let source_tokenizer = self.source_tokenizer.clone();
        let inputs = inputs.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = inner.lock().map_err(|_| {
                TranslationError::InternalError("model mutex poisoned".to_string())
            })?;

            inputs
                .iter()
                .map(|text| model.translate_one(&source_tokenizer, text))
                .collect()
        })
        .await
        .map_err(|e| TranslationError::InternalError(e.to_string()))?
    }
}

impl fmt::Debug for LocalPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalPipeline")
            .field("max_position_embeddings", &self.max_position_embeddings)
            .finish()
    }
}

impl LocalModel {
    /// Greedy encoder/decoder pass for one input
    fn translate_one(&mut self, source_tokenizer: &Tokenizer, text: &str) -> Result<String> {
        let mut tokens = source_tokenizer
            .encode(text, true)
            .map_err(|e| TranslationError::TokenizerError {
                message: e.to_string(),
            })?
            .get_ids()
            .to_vec();
        tokens.push(self.config.eos_token_id);

        let tokens = Tensor::new(tokens.as_slice(), &self.device)?.unsqueeze(0)?;
        let encoder_xs = self.model.encoder().forward(&tokens, 0)?;

        let mut token_ids = vec![self.config.decoder_start_token_id];
        // Temperature of None makes the processor deterministic
        let mut logits_processor = LogitsProcessor::new(1337, None, None);

        for index in 0..self.config.max_position_embeddings {
            let context_size = if index >= 1 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let input_ids = Tensor::new(&token_ids[start_pos..], &self.device)?.unsqueeze(0)?;

            let logits = self.model.decode(&input_ids, &encoder_xs, start_pos)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;

            let next_token = logits_processor.sample(&logits)?;
            if next_token == self.config.eos_token_id
                || next_token == self.config.forced_eos_token_id
            {
                break;
            }
            token_ids.push(next_token);
        }

        let translation = self
            .target_tokenizer
            .decode(&token_ids[1..], true)
            .map_err(|e| TranslationError::TokenizerError {
                message: e.to_string(),
            })?;

        // Stale KV entries would corrupt the next input in the batch
        self.model.reset_kv_cache();

        debug!("Translated {} chars -> {} chars", text.len(), translation.len());
        Ok(translation)
    }
}

fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path).map_err(|e| TranslationError::TokenizerError {
        message: format!("{}: {e}", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_config_parsing() {
        let raw = r#"{
            "vocab_size": 60522,
            "max_position_embeddings": 512,
            "encoder_layers": 6,
            "encoder_ffn_dim": 2048,
            "encoder_attention_heads": 8,
            "decoder_layers": 6,
            "decoder_ffn_dim": 2048,
            "decoder_attention_heads": 8,
            "d_model": 512,
            "decoder_start_token_id": 60521,
            "pad_token_id": 60521,
            "eos_token_id": 0,
            "activation_function": "swish",
            "model_type": "marian"
        }"#;

        let config: HubConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.max_position_embeddings, 512);

        let marian = config.to_marian();
        assert_eq!(marian.vocab_size, 60522);
        assert_eq!(marian.decoder_vocab_size, Some(60522));
        assert_eq!(marian.forced_eos_token_id, 0);
        assert!(marian.scale_embedding);
    }

    #[test]
    fn test_missing_model_dir() {
        assert!(ModelFiles::in_dir(Path::new("/nonexistent/model")).is_err());
    }
}
