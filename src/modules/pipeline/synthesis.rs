/// Module synthesis stage: collected document summaries to an ordered
/// learning path of 4-8 modules.
///
/// Contract: returns an empty list on any failure. Callers must treat an
/// empty result as "generation failed" and record an error state, never as
/// "zero modules intended".
use crate::modules::course::domain::entities::CourseModule;
use crate::modules::pipeline::{parse, prompts};
use crate::modules::provider::CompletionClient;
use crate::{log_info, log_warn};
use std::sync::Arc;

const MODULES_MAX_TOKENS: u32 = 4096;

pub struct ModuleSynthesizer {
    llm: Arc<dyn CompletionClient>,
}

impl ModuleSynthesizer {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Generate the module list for a course from its name, description and
    /// the (file_name, summary) pairs of its documents. Documents without a
    /// summary are skipped; with no materials at all the plan falls back to
    /// the course name and description alone.
    pub async fn generate(
        &self,
        course_name: &str,
        course_description: Option<&str>,
        summaries: &[(String, Option<String>)],
    ) -> Vec<CourseModule> {
        let context = summaries
            .iter()
            .filter_map(|(file_name, summary)| {
                summary
                    .as_ref()
                    .map(|s| format!("PDF: {}\nSummary: {}", file_name, s))
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let description = course_description.unwrap_or("");
        if context.is_empty() && description.is_empty() {
            log_warn!(
                "No materials or description for course '{}', nothing to synthesize",
                course_name
            );
            return Vec::new();
        }

        let materials = if context.is_empty() {
            None
        } else {
            Some(context.as_str())
        };
        let prompt = prompts::course_modules(course_name, description, materials);

        let response = match self.llm.complete(&prompt, MODULES_MAX_TOKENS).await {
            Ok(response) => response,
            Err(e) => {
                log_warn!("Module synthesis call failed for '{}': {}", course_name, e);
                return Vec::new();
            }
        };

        let modules = parse_module_list(&response);
        if modules.is_empty() {
            log_warn!("Module synthesis produced no valid plan for '{}'", course_name);
        } else {
            log_info!("Generated {} modules for '{}'", modules.len(), course_name);
        }

        modules
    }
}

/// All-or-nothing parse of the synthesized plan: the payload must be a JSON
/// array of records each carrying `name` and `content`. Any violation
/// discards the entire result.
pub fn parse_module_list(response: &str) -> Vec<CourseModule> {
    let Some(json) = parse::extract_json_array(response) else {
        log_warn!("Could not find a JSON array in the synthesis response");
        return Vec::new();
    };

    match serde_json::from_str::<Vec<CourseModule>>(&json) {
        Ok(modules) => modules,
        Err(e) => {
            log_warn!("Synthesized module list failed validation: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::llm::MockCompletionClient;
    use crate::shared::errors::AppError;

    #[test]
    fn parse_accepts_valid_list() {
        let response = r#"[
            {"name": "Basics", "content": "Start here"},
            {"name": "More", "content": "Then this"}
        ]"#;

        let modules = parse_module_list(response);
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "Basics");
        assert_eq!(modules[1].content, "Then this");
    }

    #[test]
    fn parse_accepts_fenced_list() {
        let response = "```json\n[{\"name\": \"A\", \"content\": \"B\"}]\n```";
        assert_eq!(parse_module_list(response).len(), 1);
    }

    #[test]
    fn parse_rejects_missing_content_wholesale() {
        let response = r#"[
            {"name": "Basics", "content": "ok"},
            {"name": "Broken"}
        ]"#;

        assert!(parse_module_list(response).is_empty());
    }

    #[test]
    fn parse_rejects_non_list() {
        assert!(parse_module_list(r#"{"name": "A", "content": "B"}"#).is_empty());
        assert!(parse_module_list("not json at all").is_empty());
    }

    #[test]
    fn parse_rejects_wrong_field_types() {
        let response = r#"[{"name": 42, "content": "B"}]"#;
        assert!(parse_module_list(response).is_empty());
    }

    #[tokio::test]
    async fn llm_failure_yields_empty() {
        let mut llm = MockCompletionClient::new();
        llm.expect_complete()
            .returning(|_, _| Err(AppError::ApiError("down".to_string())));

        let synthesizer = ModuleSynthesizer::new(Arc::new(llm));
        let modules = synthesizer
            .generate("Rust 101", Some("An intro"), &[])
            .await;

        assert!(modules.is_empty());
    }

    #[tokio::test]
    async fn no_materials_and_no_description_short_circuits() {
        let mut llm = MockCompletionClient::new();
        llm.expect_complete().never();

        let synthesizer = ModuleSynthesizer::new(Arc::new(llm));
        let modules = synthesizer.generate("Rust 101", None, &[]).await;

        assert!(modules.is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_description_without_documents() {
        let mut llm = MockCompletionClient::new();
        llm.expect_complete()
            .withf(|prompt, _| prompt.contains("No course materials provided yet"))
            .returning(|_, _| Ok(r#"[{"name": "A", "content": "B"}]"#.to_string()));

        let synthesizer = ModuleSynthesizer::new(Arc::new(llm));
        let modules = synthesizer
            .generate("Rust 101", Some("An introduction to Rust"), &[])
            .await;

        assert_eq!(modules.len(), 1);
    }

    #[tokio::test]
    async fn unsummarized_documents_are_skipped() {
        let mut llm = MockCompletionClient::new();
        llm.expect_complete()
            .withf(|prompt, _| {
                prompt.contains("notes.pdf") && !prompt.contains("pending.pdf")
            })
            .returning(|_, _| Ok(r#"[{"name": "A", "content": "B"}]"#.to_string()));

        let synthesizer = ModuleSynthesizer::new(Arc::new(llm));
        let summaries = vec![
            ("notes.pdf".to_string(), Some("About ownership".to_string())),
            ("pending.pdf".to_string(), None),
        ];
        let modules = synthesizer.generate("Rust 101", None, &summaries).await;

        assert_eq!(modules.len(), 1);
    }
}
