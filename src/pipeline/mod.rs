#[cfg(test)]
mod tests;

use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;
use crate::chain::AnswerChain;
use crate::config::Config;
use crate::embeddings::JinaClient;
use crate::llm::DeepSeekClient;
use crate::loader::MarkdownLoader;
use crate::store::{Retriever, VectorStore};

/// Wires the loader, embedding client, vector store, and chat client into
/// the two pipeline entry points: `build_index` and `query`.
///
/// Construction performs no network I/O. `ensure_ready` is the explicit
/// prepare step that binds the store and builds the answer chain; `query`
/// calls it on first use.
pub struct RagPipeline {
    config: Config,
    loader: MarkdownLoader,
    store: VectorStore,
    llm: DeepSeekClient,
    chain: Option<AnswerChain<Retriever, DeepSeekClient>>,
}

impl RagPipeline {
    #[inline]
    pub fn new(config: Config, rebuild_index: bool) -> Result<Self> {
        config
            .validate()
            .map_err(|e| crate::RagError::Config(e.to_string()))?;

        let embedder = Arc::new(JinaClient::new(&config.embedding)?);
        let store = VectorStore::new(&config.store, embedder, rebuild_index);
        let llm = DeepSeekClient::new(&config.llm)?;
        let loader = MarkdownLoader::new(&config.splitter);

        Ok(Self {
            config,
            loader,
            store,
            llm,
            chain: None,
        })
    }

    /// Load, embed, and store all documents matching the given glob
    /// patterns (defaulting to the configured ones). Returns the number of
    /// loaded chunks.
    #[inline]
    pub async fn build_index(&mut self, patterns: Option<&[String]>) -> Result<usize> {
        let patterns = patterns.unwrap_or(&self.config.doc_patterns);

        info!("Loading documents from {} patterns", patterns.len());
        let chunks = self.loader.load_documents(patterns);
        info!("Loaded {} chunks", chunks.len());

        self.store.create_from_documents(&chunks).await?;
        Ok(chunks.len())
    }

    /// Bind the store's retriever and construct the answer chain.
    /// Idempotent; later calls are no-ops.
    #[inline]
    pub async fn ensure_ready(&mut self) -> Result<()> {
        if self.chain.is_some() {
            return Ok(());
        }

        debug!("Initializing answer chain (search_k={})", self.config.search_k);
        let retriever = self.store.get_retriever(self.config.search_k).await?;
        self.chain = Some(AnswerChain::new(retriever, self.llm.clone()));
        Ok(())
    }

    /// Answer a question from the indexed documents.
    #[inline]
    pub async fn query(&mut self, question: &str) -> Result<String> {
        self.ensure_ready().await?;
        let chain = self
            .chain
            .as_ref()
            .ok_or_else(|| crate::RagError::Store("Answer chain not initialized".to_string()))?;

        debug!("Answering question: {}", question);
        chain.answer(question).await
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
