//! bntrans - English/Bangla machine translation over pretrained Marian models
//!
//! Wraps a pretrained translation model behind a single [`Translator`] type.
//! Input that fits the model's token budget is translated whole; longer input
//! is segmented into sentences, translated sentence by sentence, and joined
//! back together with a configurable delimiter.
//!
//! ```no_run
//! use bntrans::{Translator, TranslatorConfig};
//!
//! # async fn demo() -> bntrans::Result<()> {
//! let translator = Translator::new(TranslatorConfig::default())?;
//! let bangla = translator.translate("Hello world!").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod processors;

// Re-export key types for convenience
pub use crate::core::{
    config::{Backend, TranslatorConfig},
    errors::{Result, TranslationError},
    models::{Language, LanguagePair},
    translator::Translator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
