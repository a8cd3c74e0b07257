//! Token counting against a model's position budget

use std::path::Path;
use tokenizers::Tokenizer;
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

/// Counts tokens the way the underlying model sees them
///
/// Falls back to a character-based estimate when no tokenizer is available,
/// which is good enough to decide whether chunking is needed.
pub struct TokenCounter {
    tokenizer: Option<Tokenizer>,
}

impl TokenCounter {
    /// Counter backed by the character-based estimate only
    pub fn heuristic() -> Self {
        Self { tokenizer: None }
    }

    /// Counter backed by a tokenizer JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| TranslationError::TokenizerError {
            message: format!("{}: {e}", path.display()),
        })?;
        Ok(Self::from_tokenizer(tokenizer))
    }

    /// Counter backed by an already loaded tokenizer
    pub fn from_tokenizer(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer: Some(tokenizer),
        }
    }

    /// Token count for a piece of text
    pub fn count(&self, text: &str) -> usize {
        match &self.tokenizer {
            Some(tokenizer) => match tokenizer.encode(text, true) {
                Ok(encoding) => encoding.get_ids().len(),
                Err(e) => {
                    debug!("Failed to tokenize text, falling back to estimate: {e}");
                    estimate(text)
                }
            },
            None => estimate(text),
        }
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("tokenizer", &self.tokenizer.is_some())
            .finish()
    }
}

/// Rough token estimate used when no tokenizer is available
fn estimate(text: &str) -> usize {
    (text.chars().count() / 4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_count() {
        let counter = TokenCounter::heuristic();
        assert_eq!(counter.count(""), 1);
        assert_eq!(counter.count("word"), 1);
        assert_eq!(counter.count(&"a".repeat(400)), 100);
    }

    #[test]
    fn test_heuristic_counts_chars_not_bytes() {
        let counter = TokenCounter::heuristic();
        // 9 Bangla codepoints, 27 bytes
        assert_eq!(counter.count("আমিঠিকআছি"), 2);
    }

    #[test]
    fn test_missing_tokenizer_file() {
        assert!(TokenCounter::from_file(Path::new("/nonexistent/tokenizer.json")).is_err());
    }
}
