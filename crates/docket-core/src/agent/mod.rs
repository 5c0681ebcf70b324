//! Question answering over the hybrid index.
//!
//! A routing step picks the partition to search, retrieval gathers
//! evidence, and a completion model writes a cited answer. Once a
//! conversation's history grows past the word budget it is folded into a
//! model-written summary.
//!
//! Model inference stays behind [`CompletionModel`]; this crate never
//! talks to an inference backend itself.

pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::config::{DEFAULT_ALPHA, DEFAULT_PARTITION, DEFAULT_TOP_K, MAX_HISTORY_WORDS};
use crate::error::AgentError;
use crate::search::HybridIndex;
use prompts::{answer_prompt, routing_prompt, summary_prompt, NO_EVIDENCE_ANSWER};

/// Text completion backend for routing, answering, and summarization.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Completes `prompt`, returning the model's text.
    async fn complete(&self, prompt: &str) -> Result<String, AgentError>;
}

/// A source citation attached to an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Citation {
    /// Source document file name
    pub document_name: String,
    /// 1-based page number
    pub page_no: u32,
}

/// An answer with the evidence citations that grounded it.
#[derive(Debug, Clone)]
pub struct AgentAnswer {
    /// Final answer text, citation lines appended
    pub text: String,
    /// Partition the evidence came from
    pub partition: String,
    /// One citation per evidence block, in rank order
    pub citations: Vec<Citation>,
}

/// Rolling conversation memory.
///
/// History is a rendered transcript. Once it exceeds
/// [`MAX_HISTORY_WORDS`] the agent replaces it with a model-written
/// summary, keeping prompts bounded in long conversations.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    history: String,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered history handed to prompts.
    pub fn history(&self) -> &str {
        &self.history
    }

    /// Appends one user/assistant exchange.
    pub fn record(&mut self, question: &str, answer: &str) {
        self.history
            .push_str(&format!("\nUser: {question}\nAssistant: {answer}\n"));
    }

    /// Words currently held in history.
    pub fn word_count(&self) -> usize {
        self.history.split_whitespace().count()
    }

    /// True once the history exceeds the summarization budget.
    pub fn needs_summary(&self) -> bool {
        self.word_count() > MAX_HISTORY_WORDS
    }

    fn replace_with_summary(&mut self, summary: String) {
        self.history = summary;
    }
}

/// Retrieval-grounded question answering pipeline.
pub struct Agent {
    index: Arc<HybridIndex>,
    model: Arc<dyn CompletionModel>,
}

impl Agent {
    pub fn new(index: Arc<HybridIndex>, model: Arc<dyn CompletionModel>) -> Self {
        Self { index, model }
    }

    /// Asks the model which partition should answer `question`.
    ///
    /// A response that names no known partition falls back to the default
    /// partition instead of failing the pipeline.
    #[instrument(skip_all, fields(question_len = question.len()))]
    pub async fn route_partition(
        &self,
        question: &str,
        history: &str,
    ) -> Result<String, AgentError> {
        let partitions = self.index.partitions()?;
        let prompt = routing_prompt(&partitions, history, question);
        let choice = self.model.complete(&prompt).await?.trim().to_string();

        if partitions.iter().any(|partition| partition == &choice) {
            debug!(partition = %choice, "Routed question");
            Ok(choice)
        } else {
            warn!(partition = %choice, "Router named an unknown partition, using default");
            Ok(DEFAULT_PARTITION.to_string())
        }
    }

    /// Answers `question` from evidence retrieved in the routed partition.
    ///
    /// Retrieval uses the production defaults for `top_k` and `alpha`.
    /// When nothing is retrieved the fixed no-evidence answer is returned
    /// without calling the model.
    #[instrument(skip_all)]
    pub async fn answer(&self, question: &str, history: &str) -> Result<AgentAnswer, AgentError> {
        let partition = self.route_partition(question, history).await?;
        let results = self
            .index
            .search(question, &partition, DEFAULT_TOP_K, DEFAULT_ALPHA, None)
            .await?;

        if results.is_empty() {
            info!(partition = %partition, "No evidence retrieved");
            return Ok(AgentAnswer {
                text: NO_EVIDENCE_ANSWER.to_string(),
                partition,
                citations: Vec::new(),
            });
        }

        let mut evidence_blocks = Vec::with_capacity(results.len());
        let mut citation_lines = Vec::with_capacity(results.len());
        let mut citations = Vec::with_capacity(results.len());
        for (rank, result) in results.iter().enumerate() {
            evidence_blocks.push(format!("[{}] {}", rank + 1, result.text));
            citation_lines.push(format!(
                "[{}] {}, Page {}",
                rank + 1,
                result.document_name,
                result.page_no
            ));
            citations.push(Citation {
                document_name: result.document_name.clone(),
                page_no: result.page_no,
            });
        }

        let prompt = answer_prompt(&evidence_blocks.join("\n\n"), history, question);
        let answer = self.model.complete(&prompt).await?;
        let text = format!(
            "{}\n\nCitations:\n{}",
            answer.trim(),
            citation_lines.join("\n")
        );
        info!(partition = %partition, evidence = results.len(), "Generated answer");

        Ok(AgentAnswer {
            text,
            partition,
            citations,
        })
    }

    /// One conversational turn: answer, record, summarize when over
    /// budget.
    pub async fn chat(
        &self,
        conversation: &mut Conversation,
        question: &str,
    ) -> Result<AgentAnswer, AgentError> {
        let answer = self.answer(question, conversation.history()).await?;
        conversation.record(question, &answer.text);

        if conversation.needs_summary() {
            debug!(
                words = conversation.word_count(),
                "Summarizing conversation history"
            );
            let summary = self
                .model
                .complete(&summary_prompt(conversation.history()))
                .await?;
            conversation.replace_with_summary(summary);
        }
        Ok(answer)
    }
}
