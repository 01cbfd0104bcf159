use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// By-title chunking thresholds, in characters.
#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Hard cap: force a chunk break when a chunk would exceed this.
    #[serde(default = "default_max_characters")]
    pub max_characters: usize,
    /// Soft cap: prefer a break at the next block boundary past this.
    #[serde(default = "default_new_after_n_chars")]
    pub new_after_n_chars: usize,
    /// Chunks shorter than this merge forward into the following chunk.
    #[serde(default = "default_combine_text_under_n_chars")]
    pub combine_text_under_n_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_characters: default_max_characters(),
            new_after_n_chars: default_new_after_n_chars(),
            combine_text_under_n_chars: default_combine_text_under_n_chars(),
        }
    }
}

fn default_max_characters() -> usize {
    1000
}
fn default_new_after_n_chars() -> usize {
    1500
}
fn default_combine_text_under_n_chars() -> usize {
    250
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RetrievalConfig {
    /// When set, rank stored chunks by cosine similarity to the query
    /// embedding and keep only the top K. Unset means fetch-all: every
    /// chunk in scope goes into the prompt and the query is not embedded.
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// `"disabled"` or `"gemini"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_embed_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            timeout_secs: default_embed_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// `"disabled"` or `"gemini"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_generate_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            timeout_secs: default_generate_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_embed_timeout_secs() -> u64 {
    30
}
fn default_generate_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    5
}
fn default_bind() -> String {
    "127.0.0.1:7501".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.max_characters == 0 {
        anyhow::bail!("chunking.max_characters must be > 0");
    }
    if config.chunking.combine_text_under_n_chars > config.chunking.max_characters {
        anyhow::bail!("chunking.combine_text_under_n_chars must not exceed chunking.max_characters");
    }
    if config.retrieval.top_k == Some(0) {
        anyhow::bail!("retrieval.top_k must be >= 1 when set");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }
    if config.embedding.is_enabled() && config.embedding.model.is_none() {
        anyhow::bail!(
            "embedding.model must be specified when provider is '{}'",
            config.embedding.provider
        );
    }

    match config.generation.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }
    if config.generation.is_enabled() && config.generation.model.is_none() {
        anyhow::bail!(
            "generation.model must be specified when provider is '{}'",
            config.generation.provider
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse("[db]\npath = \"data/docqa.sqlite\"\n").unwrap();
        assert_eq!(config.chunking.max_characters, 1000);
        assert_eq!(config.chunking.new_after_n_chars, 1500);
        assert_eq!(config.chunking.combine_text_under_n_chars, 250);
        assert_eq!(config.retrieval.top_k, None);
        assert!(!config.embedding.is_enabled());
        assert!(!config.generation.is_enabled());
    }

    #[test]
    fn enabled_provider_requires_model() {
        let err = parse("[db]\npath = \"x.sqlite\"\n[embedding]\nprovider = \"gemini\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("embedding.model"));
    }

    #[test]
    fn unknown_provider_rejected() {
        let err = parse("[db]\npath = \"x.sqlite\"\n[generation]\nprovider = \"openai\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("Unknown generation provider"));
    }

    #[test]
    fn zero_top_k_rejected() {
        let err = parse("[db]\npath = \"x.sqlite\"\n[retrieval]\ntop_k = 0\n").unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }
}
