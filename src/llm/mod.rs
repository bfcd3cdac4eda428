// Chat completion adapter over an OpenAI-compatible remote API.

pub mod deepseek;

pub use deepseek::DeepSeekClient;

use crate::Result;

/// Capability interface for text completion, so the answer chain can be
/// exercised with a fake model in tests.
pub trait ChatModel {
    /// Submit a single prompt and return the plain-text completion.
    fn complete(&self, prompt: &str) -> Result<String>;
}
