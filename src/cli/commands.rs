//! CLI argument definitions and handlers

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::config::{Backend, TranslatorConfig};
use crate::core::translator::Translator;

/// Translate text between English and Bangla
#[derive(Parser, Debug)]
#[command(name = "bntrans", version, about, long_about = None)]
pub struct Args {
    /// Text to translate, or a path to a UTF-8 text file
    pub text: String,

    /// Source language (en or bn)
    #[arg(short, long, default_value = "en")]
    pub src: String,

    /// Destination language (en or bn)
    #[arg(short, long, default_value = "bn")]
    pub dest: String,

    /// Model to use instead of the default for the language pair
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum input length in tokens before sentence chunking kicks in
    #[arg(short = 'l', long)]
    pub max_length: Option<usize>,

    /// Use the Hugging Face Inference API instead of a local model
    #[arg(short = 'c', long)]
    pub cloud: bool,

    /// Hugging Face API token (defaults to the HUGGINGFACE_TOKEN env var)
    #[arg(short = 't', long)]
    pub token: Option<String>,

    /// Delimiter used to join sentence-level translations
    #[arg(long, default_value = "\n")]
    pub delimiter: String,

    /// Directory holding config.json, model.safetensors and the tokenizer files
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Tokenizer JSON file used for token counting
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run a translation and print it to stdout
pub async fn run(args: Args) -> anyhow::Result<()> {
    let text = read_input(&args.text).await?;
    let config = build_config(&args)?;

    let translator = Translator::new(config)?;
    info!("Translating with {}", translator.model());

    let translation = translator.translate(&text).await?;
    println!("{translation}");

    Ok(())
}

/// Apply CLI overrides on top of the environment configuration
fn build_config(args: &Args) -> anyhow::Result<TranslatorConfig> {
    let mut config = TranslatorConfig::from_env()?;

    config.src = args.src.parse()?;
    config.dest = args.dest.parse()?;
    config.model = args.model.clone();
    config.max_length = args.max_length;
    config.backend = if args.cloud {
        Backend::Cloud
    } else {
        Backend::Local
    };
    config.tokenizer_file = args.tokenizer.clone();
    config.delimiter = args.delimiter.clone();

    if let Some(token) = &args.token {
        config.api_token = Some(token.clone());
    }
    if let Some(dir) = &args.model_dir {
        config.model_dir = Some(dir.clone());
    }

    Ok(config)
}

/// Treat the positional argument as a file path when one exists on disk
async fn read_input(text: &str) -> anyhow::Result<String> {
    let path = Path::new(text);
    if path.is_file() {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    } else {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Language;
    use std::io::Write;

    fn base_args() -> Args {
        Args {
            text: "Hello world!".to_string(),
            src: "en".to_string(),
            dest: "bn".to_string(),
            model: None,
            max_length: None,
            cloud: false,
            token: None,
            delimiter: "\n".to_string(),
            model_dir: None,
            tokenizer: None,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_read_input_literal() {
        let text = read_input("not a file, just text").await.unwrap();
        assert_eq!(text, "not a file, just text");
    }

    #[tokio::test]
    async fn test_read_input_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "text from a file").unwrap();

        let text = read_input(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(text, "text from a file");
    }

    #[test]
    fn test_build_config_overrides() {
        let mut args = base_args();
        args.src = "bn".to_string();
        args.dest = "en".to_string();
        args.cloud = true;
        args.token = Some("hf_test".to_string());
        args.max_length = Some(64);
        args.delimiter = " ".to_string();

        let config = build_config(&args).unwrap();
        assert_eq!(config.src, Language::Bn);
        assert_eq!(config.dest, Language::En);
        assert_eq!(config.backend, Backend::Cloud);
        assert_eq!(config.api_token.as_deref(), Some("hf_test"));
        assert_eq!(config.max_length, Some(64));
        assert_eq!(config.delimiter, " ");
    }

    #[test]
    fn test_build_config_rejects_unknown_language() {
        let mut args = base_args();
        args.src = "fr".to_string();
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::parse_from(["bntrans", "Hello world!"]);
        assert_eq!(args.text, "Hello world!");
        assert_eq!(args.src, "en");
        assert_eq!(args.dest, "bn");
        assert!(!args.cloud);
        assert_eq!(args.delimiter, "\n");
    }
}
