/// Question synthesis stage: one module to a small multiple-choice quiz.
///
/// Runs independently per module; a failed module contributes zero
/// questions and never affects its siblings. Validation mirrors module
/// synthesis: the whole module's question set is rejected on any violation.
use crate::modules::assessment::domain::entities::NewQuestion;
use crate::modules::course::domain::entities::CourseModule;
use crate::modules::pipeline::{parse, prompts};
use crate::modules::provider::CompletionClient;
use crate::{log_info, log_warn};
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;

const QUESTIONS_MAX_TOKENS: u32 = 2048;
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Raw question record as produced by the completion service, before
/// validation and module tagging.
#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question_text: String,
    options: Vec<String>,
    correct_answer_index: i32,
}

pub struct QuestionSynthesizer {
    llm: Arc<dyn CompletionClient>,
}

impl QuestionSynthesizer {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Generate 1-2 questions for a single module, tagged with its position.
    /// Returns an empty vec when generation or validation fails.
    pub async fn generate_for_module(
        &self,
        module: &CourseModule,
        module_index: usize,
    ) -> Vec<NewQuestion> {
        let prompt = prompts::module_questions(&module.name, &module.content);

        let response = match self.llm.complete(&prompt, QUESTIONS_MAX_TOKENS).await {
            Ok(response) => response,
            Err(e) => {
                log_warn!(
                    "Question generation call failed for module '{}': {}",
                    module.name,
                    e
                );
                return Vec::new();
            }
        };

        let questions = parse_question_set(&response, module_index as i32);
        if questions.is_empty() {
            log_warn!("No valid questions for module '{}'", module.name);
        } else {
            log_info!(
                "Generated {} questions for module '{}'",
                questions.len(),
                module.name
            );
        }

        questions
    }

    /// Generate questions for every module of a course in parallel. The
    /// result is the concatenation of per-module results in module order;
    /// failed modules contribute nothing.
    pub async fn generate_for_course(&self, modules: &[CourseModule]) -> Vec<NewQuestion> {
        let tasks = modules
            .iter()
            .enumerate()
            .map(|(index, module)| self.generate_for_module(module, index));

        join_all(tasks).await.into_iter().flatten().collect()
    }
}

/// Validate and tag one module's question set. Any structural violation
/// (missing field, wrong option count, out-of-range answer index) rejects
/// the whole set.
fn parse_question_set(response: &str, module_index: i32) -> Vec<NewQuestion> {
    let Some(json) = parse::extract_json_array(response) else {
        log_warn!("Could not find a JSON array in the question response");
        return Vec::new();
    };

    let generated: Vec<GeneratedQuestion> = match serde_json::from_str(&json) {
        Ok(generated) => generated,
        Err(e) => {
            log_warn!("Question set failed validation: {}", e);
            return Vec::new();
        }
    };

    for (i, question) in generated.iter().enumerate() {
        if question.options.len() != OPTIONS_PER_QUESTION {
            log_warn!(
                "Question {} has {} options instead of {}",
                i,
                question.options.len(),
                OPTIONS_PER_QUESTION
            );
            return Vec::new();
        }
        if question.correct_answer_index < 0
            || question.correct_answer_index >= OPTIONS_PER_QUESTION as i32
        {
            log_warn!(
                "Question {} has out-of-range correct_answer_index {}",
                i,
                question.correct_answer_index
            );
            return Vec::new();
        }
    }

    if generated.is_empty() || generated.len() > 2 {
        // Count drift is tolerated with a warning as long as every
        // question is structurally valid.
        log_warn!("Expected 1-2 questions, got {}", generated.len());
    }

    generated
        .into_iter()
        .map(|q| NewQuestion {
            module_index,
            question_text: q.question_text,
            options: q.options,
            correct_answer_index: q.correct_answer_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::llm::MockCompletionClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn valid_response() -> String {
        r#"[
            {
                "question_text": "What does ownership guarantee?",
                "options": ["Memory safety", "Speed", "Smaller binaries", "Faster compiles"],
                "correct_answer_index": 0
            }
        ]"#
        .to_string()
    }

    fn module(name: &str) -> CourseModule {
        CourseModule {
            name: name.to_string(),
            content: format!("Content of {}", name),
        }
    }

    #[test]
    fn parse_accepts_valid_set_and_tags_module() {
        let questions = parse_question_set(&valid_response(), 3);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].module_index, 3);
        assert_eq!(questions[0].options.len(), 4);
    }

    #[test]
    fn parse_rejects_wrong_option_count() {
        let response = r#"[
            {
                "question_text": "Q?",
                "options": ["a", "b", "c"],
                "correct_answer_index": 0
            }
        ]"#;
        assert!(parse_question_set(response, 0).is_empty());
    }

    #[test]
    fn parse_rejects_out_of_range_answer_index() {
        let response = r#"[
            {
                "question_text": "Q?",
                "options": ["a", "b", "c", "d"],
                "correct_answer_index": 4
            }
        ]"#;
        assert!(parse_question_set(response, 0).is_empty());
    }

    #[test]
    fn parse_rejects_whole_set_on_one_bad_question() {
        let response = r#"[
            {
                "question_text": "Fine",
                "options": ["a", "b", "c", "d"],
                "correct_answer_index": 1
            },
            {
                "question_text": "Broken",
                "options": ["a", "b", "c", "d"],
                "correct_answer_index": -1
            }
        ]"#;
        assert!(parse_question_set(response, 0).is_empty());
    }

    #[test]
    fn parse_rejects_missing_field() {
        let response = r#"[
            {
                "question_text": "Q?",
                "options": ["a", "b", "c", "d"]
            }
        ]"#;
        assert!(parse_question_set(response, 0).is_empty());
    }

    #[tokio::test]
    async fn course_level_concatenates_in_module_order() {
        let mut llm = MockCompletionClient::new();
        llm.expect_complete().returning(|prompt, _| {
            // Encode the module name into the question so order is visible.
            let name = if prompt.contains("Module Name: first") {
                "first"
            } else {
                "second"
            };
            Ok(format!(
                r#"[{{"question_text": "About {}?", "options": ["a","b","c","d"], "correct_answer_index": 0}}]"#,
                name
            ))
        });

        let synthesizer = QuestionSynthesizer::new(Arc::new(llm));
        let modules = vec![module("first"), module("second")];
        let questions = synthesizer.generate_for_course(&modules).await;

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].module_index, 0);
        assert!(questions[0].question_text.contains("first"));
        assert_eq!(questions[1].module_index, 1);
        assert!(questions[1].question_text.contains("second"));
    }

    #[tokio::test]
    async fn failed_module_contributes_zero_questions() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut llm = MockCompletionClient::new();
        llm.expect_complete().returning(|prompt, _| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("Module Name: broken") {
                Ok("no json here".to_string())
            } else {
                Ok(
                    r#"[{"question_text": "Q?", "options": ["a","b","c","d"], "correct_answer_index": 2}]"#
                        .to_string(),
                )
            }
        });

        let synthesizer = QuestionSynthesizer::new(Arc::new(llm));
        let modules = vec![module("fine"), module("broken"), module("also fine")];
        let questions = synthesizer.generate_for_course(&modules).await;

        assert_eq!(CALLS.load(Ordering::SeqCst), 3, "every module attempted");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].module_index, 0);
        assert_eq!(questions[1].module_index, 2);
    }
}
