/// Summarization stage: one uploaded document to one text summary.
///
/// This stage never fails past its boundary. Extraction and completion
/// failures collapse to sentinel strings so the pipeline keeps moving for
/// the course's other documents; the coordinator persists whatever comes
/// back.
use crate::modules::pipeline::prompts;
use crate::modules::provider::{CompletionClient, ExtractionPool};
use crate::{log_info, log_warn};
use std::sync::Arc;

/// Character budget before the document text is truncated for the
/// completion request (roughly 100k tokens).
const MAX_TEXT_CHARS: usize = 300_000;
const TRUNCATION_MARKER: &str = "\n\n[Text truncated due to length...]";
const SUMMARY_MAX_TOKENS: u32 = 1024;

pub const EXTRACTION_FAILED_SUMMARY: &str = "Unable to extract text from PDF";

pub struct Summarizer {
    llm: Arc<dyn CompletionClient>,
    extraction: Arc<ExtractionPool>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn CompletionClient>, extraction: Arc<ExtractionPool>) -> Self {
        Self { llm, extraction }
    }

    /// Summarize one document. Always returns a string: either the summary
    /// or a sentinel describing what went wrong.
    pub async fn summarize(&self, data: Vec<u8>, file_name: &str) -> String {
        let text = match self.extraction.extract(data).await {
            Ok(text) => text,
            Err(e) => {
                log_warn!("Text extraction failed for '{}': {}", file_name, e);
                return EXTRACTION_FAILED_SUMMARY.to_string();
            }
        };

        if text.trim().len() < 10 {
            log_warn!("Document '{}' produced no usable text", file_name);
            return EXTRACTION_FAILED_SUMMARY.to_string();
        }

        let text = truncate_for_request(&text);

        let prompt = prompts::document_summary(file_name, &text);
        match self.llm.complete(&prompt, SUMMARY_MAX_TOKENS).await {
            Ok(summary) => {
                log_info!("Summarized document '{}'", file_name);
                summary
            }
            Err(e) => {
                log_warn!("Summary generation failed for '{}': {}", file_name, e);
                format!("Error generating summary: {}", e)
            }
        }
    }
}

/// Truncation is explicit: the marker is appended so downstream stages see
/// that the source was cut, never silently shortened.
fn truncate_for_request(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_CHARS {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(MAX_TEXT_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
