//! Question answering over the current record snapshot.

use surveillance_map_analytics::summary::is_no_match;
use surveillance_map_analytics::{REGION_NAME, extract_intent, filter, summarize};
use surveillance_map_records_models::Record;

use crate::providers::TextGenerator;

/// Reply for an empty chat message.
pub const EMPTY_QUESTION_REPLY: &str = "Please enter a question.";

/// Builds the generation prompt from summary lines and the user's question.
#[must_use]
pub fn build_prompt(summary: &[String], question: &str) -> String {
    format!(
        "Based on this {REGION_NAME} health data, answer the user's question:\n\n\
         DATA:\n{}\n\n\
         USER QUESTION: {question}\n\n\
         Provide a clear, factual answer using only the data above:",
        summary.join("\n")
    )
}

/// Summary lines for `question` over `records`.
#[must_use]
pub fn summarize_question(records: &[Record], question: &str) -> Vec<String> {
    let intent = extract_intent(question);
    let matching = filter(records, &intent);
    summarize(&matching, &intent)
}

/// Answers `question` from `records`.
///
/// The records are summarized first. When something matched and a
/// generator is available, the generator phrases the answer from the
/// summary; otherwise, or when generation fails or comes back blank, the
/// first summary line is returned as-is.
pub async fn answer_question(
    generator: Option<&dyn TextGenerator>,
    records: &[Record],
    question: &str,
) -> String {
    let question = question.trim();
    if question.is_empty() {
        return EMPTY_QUESTION_REPLY.to_string();
    }

    let summary = summarize_question(records, question);
    let headline = summary.first().cloned().unwrap_or_default();

    if is_no_match(&summary) {
        return headline;
    }
    let Some(generator) = generator else {
        log::debug!("No text generator configured, answering with summary headline");
        return headline;
    };

    let prompt = build_prompt(&summary, question);
    match generator.generate(&prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            log::warn!("{} returned an empty answer", generator.name());
            headline
        }
        Err(e) => {
            log::error!("{} generation failed: {e}", generator.name());
            headline
        }
    }
}
