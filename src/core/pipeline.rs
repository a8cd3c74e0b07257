//! One calling convention over the inference backends

use crate::core::cloud::CloudPipeline;
use crate::core::errors::Result;

#[cfg(feature = "local")]
use crate::core::local::LocalPipeline;

/// Inference backend behind a single `generate` call
///
/// Every backend takes a batch of inputs and answers with one translation per
/// input, in input order.
#[derive(Debug)]
pub enum TranslationPipeline {
    /// Hosted inference API
    Cloud(CloudPipeline),
    /// Pretrained model executed in-process
    #[cfg(feature = "local")]
    Local(LocalPipeline),
    /// Marks each input so tests can observe chunking
    #[cfg(test)]
    Echo,
}

impl TranslationPipeline {
    /// Translate a batch of inputs
    pub async fn generate(&self, inputs: &[String]) -> Result<Vec<String>> {
        match self {
            TranslationPipeline::Cloud(pipeline) => pipeline.generate(inputs).await,
            #[cfg(feature = "local")]
            TranslationPipeline::Local(pipeline) => pipeline.generate(inputs).await,
            #[cfg(test)]
            TranslationPipeline::Echo => {
                Ok(inputs.iter().map(|text| format!("<{text}>")).collect())
            }
        }
    }
}
