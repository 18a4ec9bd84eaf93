/// Repository traits for questions, attempts and the leaderboard.
use super::entities::{LeaderboardEntry, NewQuestion, Question, TestAttempt};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist a batch of accepted questions for a course. Returns the
    /// number stored.
    async fn insert_many(&self, course_id: Uuid, questions: &[NewQuestion]) -> AppResult<usize>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Question>>;

    /// All questions of a course ordered by module index, then creation.
    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Question>>;

    /// Remove a course's questions, used when its modules are regenerated.
    async fn delete_for_course(&self, course_id: Uuid) -> AppResult<usize>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, course_id: Uuid) -> AppResult<TestAttempt>;

    /// Most recent attempt not yet completed, if any.
    async fn latest_incomplete(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<TestAttempt>>;

    /// Most recent completed attempt, if any.
    async fn latest_completed(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<TestAttempt>>;

    async fn mark_completed(&self, attempt_id: Uuid) -> AppResult<()>;

    async fn record_answer(
        &self,
        attempt_id: Uuid,
        question_id: Uuid,
        selected_option_index: i32,
        is_correct: bool,
    ) -> AppResult<()>;

    /// (module_index, is_correct) pairs for an attempt's answers.
    async fn answers_with_modules(&self, attempt_id: Uuid) -> AppResult<Vec<(i32, bool)>>;

    /// Ranked leaderboard across all users.
    async fn leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>>;
}
