/// Repository trait for lesson persistence.
///
/// The video status column carries the per-lesson state machine; the
/// transition methods are atomic conditional updates, mirroring the course
/// module generation claim.
use super::entities::Lesson;
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn find(&self, course_id: Uuid, module_index: i32) -> AppResult<Option<Lesson>>;

    /// Fetch the lesson for (course, module index), creating it with the
    /// given content on first access. Concurrent creations collapse onto
    /// the existing row.
    async fn get_or_create(
        &self,
        course_id: Uuid,
        module_index: i32,
        content: &str,
    ) -> AppResult<Lesson>;

    /// Claim the pending -> generating transition for the video. Returns
    /// whether this caller won the claim.
    async fn try_begin_video(&self, course_id: Uuid, module_index: i32) -> AppResult<bool>;

    async fn complete_video(
        &self,
        course_id: Uuid,
        module_index: i32,
        video_path: &str,
    ) -> AppResult<()>;

    async fn fail_video(&self, course_id: Uuid, module_index: i32, error: &str) -> AppResult<()>;

    /// Explicit user retry: terminal status -> pending, error and path
    /// cleared. Returns false when the video was not in a terminal state.
    async fn reset_video(&self, course_id: Uuid, module_index: i32) -> AppResult<bool>;

    /// Remove a course's lessons, used when its modules are regenerated.
    async fn delete_for_course(&self, course_id: Uuid) -> AppResult<usize>;

    /// Mark lessons stuck in `generating` longer than `older_than` as
    /// errored. Returns the ids that were reconciled.
    async fn reconcile_stale_generating(&self, older_than: Duration) -> AppResult<Vec<Uuid>>;
}
