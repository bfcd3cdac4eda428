
use tracing::debug;

use crate::Result;
use crate::llm::ChatModel;
use crate::store::Retrieve;

/// Prompt sent to the chat model, with the retrieved context block and the
/// user question substituted in.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
Human: You are an AI assistant. You are able to find answers to the questions from the contextual passage snippets provided.

Use the following pieces of information enclosed in <context> tags to provide an answer to the question enclosed in <question> tags.
<context>
{context}
</context>
<question>
{question}
</question>

Assistant:";

/// Composes retrieval, prompt templating, and chat completion into a single
/// question-to-answer step. Strictly sequential and single-pass: no
/// re-ranking, no refinement, and any retrieval or completion failure
/// propagates unchanged.
pub struct AnswerChain<R, C> {
    retriever: R,
    llm: C,
    prompt_template: String,
}

impl<R: Retrieve, C: ChatModel> AnswerChain<R, C> {
    #[inline]
    pub fn new(retriever: R, llm: C) -> Self {
        Self {
            retriever,
            llm,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }

    #[inline]
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Answer a question from the indexed documents: retrieve the top-k
    /// chunks, join their texts into a context block, fill the prompt
    /// template, and return the model's completion.
    #[inline]
    pub async fn answer(&self, question: &str) -> Result<String> {
        debug!("Retrieving context for question");
        let results = self.retriever.retrieve(question).await?;
        debug!("Retrieved {} context chunks", results.len());

        let context = results
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = self
            .prompt_template
            .replace("{context}", &context)
            .replace("{question}", question);

        debug!("Submitting prompt of {} characters", prompt.chars().count());
        self.llm.complete(&prompt)
    }
}
