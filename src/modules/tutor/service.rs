/// Conversational tutoring over a single course module.
use crate::log_debug;
use crate::modules::course::domain::repository::CourseRepository;
use crate::modules::pipeline::prompts;
use crate::modules::provider::llm::{ChatMessage, ChatRole, CompletionClient};
use crate::shared::errors::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

const REPLY_MAX_TOKENS: u32 = 2048;

/// Answers student questions in the context of one course module.
///
/// The module's name and content are folded into the system prompt on every
/// call, so the coach never drifts to material outside the module. No
/// conversation state is kept here.
pub struct TutorService {
    courses: Arc<dyn CourseRepository>,
    llm: Arc<dyn CompletionClient>,
}

impl TutorService {
    pub fn new(courses: Arc<dyn CourseRepository>, llm: Arc<dyn CompletionClient>) -> Self {
        Self { courses, llm }
    }

    /// Produce the coach's next reply for a conversation about the given
    /// module. The last message must come from the student.
    pub async fn reply(
        &self,
        course_id: Uuid,
        module_index: i32,
        conversation: &[ChatMessage],
    ) -> AppResult<String> {
        if conversation.is_empty() {
            return Err(AppError::InvalidInput(
                "Conversation cannot be empty".to_string(),
            ));
        }
        if conversation.last().map(|m| m.role) != Some(ChatRole::User) {
            return Err(AppError::InvalidInput(
                "Conversation must end with a user message".to_string(),
            ));
        }

        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;

        let module = usize::try_from(module_index)
            .ok()
            .and_then(|i| course.module_at(i))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Course {} has no module {}",
                    course_id, module_index
                ))
            })?;

        log_debug!(
            "Tutor reply for course {} module {} ({} turns)",
            course_id,
            module_index,
            conversation.len()
        );

        let system = prompts::learning_coach(&course.name, &module.name, &module.content);
        self.llm.chat(&system, conversation, REPLY_MAX_TOKENS).await
    }
}
