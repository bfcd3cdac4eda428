// Embedding adapter: a uniform "embed batch" / "embed query" contract over a
// remote embedding API.

pub mod jina;

pub use jina::JinaClient;

use crate::Result;

/// Capability interface for producing embeddings. The store and pipeline
/// only depend on this trait, so tests can substitute in-memory fakes.
pub trait Embedder: Send + Sync {
    /// Embed a batch of passage texts, one vector per input, all of the same
    /// fixed dimensionality. An empty input must return an empty output
    /// without touching the network.
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimensionality, discovered by embedding a canary string and
    /// measuring the result.
    fn dimension(&self) -> Result<usize> {
        Ok(self.embed_one("dimension probe")?.len())
    }
}
