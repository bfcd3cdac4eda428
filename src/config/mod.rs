#[cfg(test)]
mod tests;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_JINA_BASE_URL: &str = "https://api.jina.ai";
pub const DEFAULT_EMBEDDING_MODEL: &str = "jina-embeddings-v4";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";
pub const DEFAULT_COLLECTION_NAME: &str = "markdown_docs";
pub const DEFAULT_DB_PATH: &str = "./data/rag-db";
pub const DEFAULT_DOC_PATTERNS: &str = "docs/**/*.md";

/// Application configuration, constructed once at startup and passed by
/// reference into every component constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub splitter: SplitterConfig,
    /// Number of nearest-neighbor chunks retrieved per query.
    pub search_k: usize,
    /// Glob patterns resolving the markdown documents to index.
    pub doc_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub late_chunking: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Local directory holding the LanceDB database.
    pub db_path: PathBuf,
    pub collection_name: String,
    pub metric: DistanceMetric,
    pub consistency: ConsistencyLevel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitterConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks of the same section.
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    InnerProduct,
    Euclidean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyLevel {
    Strong,
    Bounded,
    Eventual,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    MissingCredential(&'static str),
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid model name: cannot be empty")]
    InvalidModel,
    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),
    #[error("Chunk overlap ({0}) must be smaller than chunk size ({1})")]
    OverlapTooLarge(usize, usize),
    #[error("Invalid search depth: {0} (must be at least 1)")]
    InvalidSearchK(usize),
    #[error("Invalid temperature: {0} (must be between 0.0 and 2.0)")]
    InvalidTemperature(f32),
    #[error("Invalid distance metric: {0} (must be 'ip' or 'l2')")]
    InvalidMetric(String),
    #[error("Invalid consistency level: {0} (must be 'strong', 'bounded' or 'eventual')")]
    InvalidConsistency(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig {
                api_key: String::new(),
                base_url: DEFAULT_JINA_BASE_URL.to_string(),
                model: DEFAULT_EMBEDDING_MODEL.to_string(),
                late_chunking: false,
            },
            llm: LlmConfig {
                api_key: String::new(),
                base_url: DEFAULT_DEEPSEEK_BASE_URL.to_string(),
                model: DEFAULT_LLM_MODEL.to_string(),
                temperature: 0.0,
            },
            store: StoreConfig {
                db_path: PathBuf::from(DEFAULT_DB_PATH),
                collection_name: DEFAULT_COLLECTION_NAME.to_string(),
                metric: DistanceMetric::InnerProduct,
                consistency: ConsistencyLevel::Bounded,
            },
            splitter: SplitterConfig {
                chunk_size: 1000,
                chunk_overlap: 200,
            },
            search_k: 3,
            doc_patterns: parse_patterns(DEFAULT_DOC_PATTERNS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// built-in defaults for everything except the API keys.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            embedding: EmbeddingConfig {
                api_key: env::var("JINAAI_API_KEY")
                    .map_err(|_| ConfigError::MissingCredential("JINAAI_API_KEY"))?,
                base_url: env_or("JINA_BASE_URL", &defaults.embedding.base_url),
                model: env_or("RAG_EMBEDDING_MODEL", &defaults.embedding.model),
                late_chunking: parse_env("RAG_LATE_CHUNKING", defaults.embedding.late_chunking)?,
            },
            llm: LlmConfig {
                api_key: env::var("DEEPSEEK_API_KEY")
                    .map_err(|_| ConfigError::MissingCredential("DEEPSEEK_API_KEY"))?,
                base_url: env_or("DEEPSEEK_BASE_URL", &defaults.llm.base_url),
                model: env_or("RAG_LLM_MODEL", &defaults.llm.model),
                temperature: parse_env("RAG_LLM_TEMPERATURE", defaults.llm.temperature)?,
            },
            store: StoreConfig {
                db_path: PathBuf::from(env_or(
                    "RAG_DB_PATH",
                    &defaults.store.db_path.to_string_lossy(),
                )),
                collection_name: env_or("RAG_COLLECTION", &defaults.store.collection_name),
                metric: parse_env("RAG_METRIC", defaults.store.metric)?,
                consistency: parse_env("RAG_CONSISTENCY", defaults.store.consistency)?,
            },
            splitter: SplitterConfig {
                chunk_size: parse_env("RAG_CHUNK_SIZE", defaults.splitter.chunk_size)?,
                chunk_overlap: parse_env("RAG_CHUNK_OVERLAP", defaults.splitter.chunk_overlap)?,
            },
            search_k: parse_env("RAG_SEARCH_K", defaults.search_k)?,
            doc_patterns: env::var("RAG_DOC_PATTERNS")
                .map(|v| parse_patterns(&v))
                .unwrap_or(defaults.doc_patterns),
        };

        config.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("JINAAI_API_KEY"));
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("DEEPSEEK_API_KEY"));
        }
        if self.embedding.model.trim().is_empty() || self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel);
        }

        Url::parse(&self.embedding.base_url)
            .map_err(|_| ConfigError::InvalidUrl(self.embedding.base_url.clone()))?;
        Url::parse(&self.llm.base_url)
            .map_err(|_| ConfigError::InvalidUrl(self.llm.base_url.clone()))?;

        if self.splitter.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.splitter.chunk_size));
        }
        if self.splitter.chunk_overlap >= self.splitter.chunk_size {
            return Err(ConfigError::OverlapTooLarge(
                self.splitter.chunk_overlap,
                self.splitter.chunk_size,
            ));
        }
        if self.search_k == 0 {
            return Err(ConfigError::InvalidSearchK(self.search_k));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidTemperature(self.llm.temperature));
        }

        Ok(())
    }
}

impl FromStr for DistanceMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ip" | "inner_product" => Ok(Self::InnerProduct),
            "l2" | "euclidean" => Ok(Self::Euclidean),
            other => Err(ConfigError::InvalidMetric(other.to_string())),
        }
    }
}

impl FromStr for ConsistencyLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strong" => Ok(Self::Strong),
            "bounded" => Ok(Self::Bounded),
            "eventual" | "eventually" => Ok(Self::Eventual),
            other => Err(ConfigError::InvalidConsistency(other.to_string())),
        }
    }
}

/// Comma-separated glob pattern list; blank entries are dropped.
#[inline]
pub fn parse_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: EnvValue>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => T::parse(&raw).map_err(|_| ConfigError::InvalidValue(key, raw)),
        Err(_) => Ok(default),
    }
}

/// Values parseable from an environment variable string.
trait EnvValue: Sized {
    fn parse(raw: &str) -> Result<Self, ()>;
}

impl EnvValue for usize {
    fn parse(raw: &str) -> Result<Self, ()> {
        raw.trim().parse().map_err(|_| ())
    }
}

impl EnvValue for f32 {
    fn parse(raw: &str) -> Result<Self, ()> {
        raw.trim().parse().map_err(|_| ())
    }
}

impl EnvValue for bool {
    fn parse(raw: &str) -> Result<Self, ()> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(()),
        }
    }
}

impl EnvValue for DistanceMetric {
    fn parse(raw: &str) -> Result<Self, ()> {
        raw.trim().parse().map_err(|_| ())
    }
}

impl EnvValue for ConsistencyLevel {
    fn parse(raw: &str) -> Result<Self, ()> {
        raw.trim().parse().map_err(|_| ())
    }
}
