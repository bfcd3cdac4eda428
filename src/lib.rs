use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Collection '{0}' does not exist. Run the build command first to create the index.")]
    CollectionNotFound(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Chat completion error: {0}")]
    Completion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chain;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod llm;
pub mod loader;
pub mod pipeline;
pub mod store;
