//! Length-adaptive translation with sentence chunking

use tracing::debug;

use crate::core::cloud::CloudPipeline;
use crate::core::config::{Backend, TranslatorConfig};
use crate::core::errors::Result;
use crate::core::pipeline::TranslationPipeline;
use crate::core::tokens::TokenCounter;
use crate::processors::sentences::{is_bangla, split_bangla, split_english};

#[cfg(not(feature = "local"))]
use crate::core::errors::TranslationError;
#[cfg(feature = "local")]
use crate::core::local::LocalPipeline;

/// Translator wrapping a pretrained model behind a token-budget check
///
/// Text that fits the budget is translated as a single unit; longer text is
/// segmented into sentences which are translated independently and joined with
/// the configured delimiter.
#[derive(Debug)]
pub struct Translator {
    config: TranslatorConfig,
    pipeline: TranslationPipeline,
    counter: TokenCounter,
    model: String,
    max_length: usize,
}

impl Translator {
    /// Build a translator from configuration
    ///
    /// Loads the local model eagerly; the cloud backend only needs a token.
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;
        let model = config.resolve_model()?;

        match config.backend {
            Backend::Cloud => {
                let pipeline = TranslationPipeline::Cloud(CloudPipeline::new(&config, &model)?);
                let counter = match &config.tokenizer_file {
                    Some(path) => TokenCounter::from_file(path)?,
                    None => TokenCounter::heuristic(),
                };
                let max_length = config.resolve_max_length(&model, None);

                Ok(Self {
                    config,
                    pipeline,
                    counter,
                    model,
                    max_length,
                })
            }
            #[cfg(feature = "local")]
            Backend::Local => {
                let local = LocalPipeline::load(&config, &model)?;
                let counter = match &config.tokenizer_file {
                    Some(path) => TokenCounter::from_file(path)?,
                    None => TokenCounter::from_tokenizer(local.source_tokenizer()),
                };
                let max_length =
                    config.resolve_max_length(&model, Some(local.max_position_embeddings()));

                Ok(Self {
                    config,
                    pipeline: TranslationPipeline::Local(local),
                    counter,
                    model,
                    max_length,
                })
            }
            #[cfg(not(feature = "local"))]
            Backend::Local => Err(TranslationError::ConfigError {
                message: "Local inference is not compiled in. Build with the `local` \
                          feature or use the cloud backend."
                    .to_string(),
            }),
        }
    }

    /// Model id in use
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Token budget applied before chunking
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Raw generations: one entry for whole-text translation, one per sentence
    /// when the input exceeded the token budget
    pub async fn generate(&self, text: &str) -> Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let token_length = self.counter.count(text);
        if token_length > self.max_length {
            let sentences = if is_bangla(text) {
                split_bangla(text)
            } else {
                split_english(text)
            };
            debug!(
                "Input is {} tokens against a budget of {}, translating {} sentences",
                token_length,
                self.max_length,
                sentences.len()
            );
            self.pipeline.generate(&sentences).await
        } else {
            debug!(
                "Input is {} tokens within the budget of {}",
                token_length, self.max_length
            );
            self.pipeline.generate(&[text.to_string()]).await
        }
    }

    /// Translate text, reassembling chunked output with the delimiter
    pub async fn translate(&self, text: &str) -> Result<String> {
        let mut results = self.generate(text).await?;
        if results.len() == 1 {
            Ok(results.remove(0))
        } else {
            Ok(results.join(&self.config.delimiter))
        }
    }
}
