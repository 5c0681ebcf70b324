//! Prompt templates for the agent pipeline.

/// Answer returned when retrieval produced no evidence.
pub const NO_EVIDENCE_ANSWER: &str =
    "No relevant information found in the enterprise documents.";

/// Builds the routing prompt asking the model to pick a partition.
pub fn routing_prompt(partitions: &[String], history: &str, question: &str) -> String {
    let listing: String = partitions
        .iter()
        .map(|partition| format!("- {partition}\n"))
        .collect();
    format!(
        "You are a routing agent for an enterprise legal document search system.\n\
         \n\
         Available partitions:\n\
         {listing}\
         \n\
         Conversation history:\n\
         {history}\n\
         \n\
         User query:\n\
         {question}\n\
         \n\
         Return ONLY the best matching partition name.\n"
    )
}

/// Builds the answering prompt around numbered evidence blocks.
pub fn answer_prompt(evidence: &str, history: &str, question: &str) -> String {
    format!(
        "You are an enterprise legal AI assistant.\n\
         Your task is to answer the given question using the provided evidence.\n\
         Use the prior conversation history if the current question relates to it.\n\
         \n\
         Evidence:\n\
         {evidence}\n\
         \n\
         Prior conversation history:\n\
         {history}\n\
         \n\
         Question:\n\
         {question}\n"
    )
}

/// Builds the history summarization prompt.
pub fn summary_prompt(history: &str) -> String {
    format!(
        "Summarize the conversation history below.\n\
         Preserve key legal facts and user intent.\n\
         \n\
         Conversation:\n\
         {history}\n\
         \n\
         Summary:\n"
    )
}
