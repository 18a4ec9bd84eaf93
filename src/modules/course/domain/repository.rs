/// Repository traits for course and document persistence.
///
/// The status columns double as the coordination medium between background
/// tasks, so the transition methods are specified as atomic conditional
/// updates rather than read-then-write pairs.
use super::entities::{Course, CourseModule, Document, DocumentMeta};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<Course>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>>;

    async fn get_all(&self) -> AppResult<Vec<Course>>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Claim the pending -> generating transition.
    ///
    /// Executes a single conditional update and returns whether this caller
    /// won the claim. Concurrent triggers collapse: at most one caller sees
    /// `true` per pending cycle.
    async fn try_begin_module_generation(&self, id: Uuid) -> AppResult<bool>;

    /// Persist the synthesized module list and mark generation completed.
    async fn complete_module_generation(
        &self,
        id: Uuid,
        modules: &[CourseModule],
    ) -> AppResult<()>;

    /// Mark generation failed with a human-readable message.
    async fn fail_module_generation(&self, id: Uuid, error: &str) -> AppResult<()>;

    /// Explicit user retry: claim terminal status -> generating directly,
    /// clearing the module list and message. The caller holds the claim and
    /// must delete dependent rows before rerunning synthesis, so a
    /// concurrent pending-cycle trigger can never interleave. Returns false
    /// when the course was not in a terminal state.
    async fn try_restart_module_generation(&self, id: Uuid) -> AppResult<bool>;

    /// Mark courses stuck in `generating` longer than `older_than` as
    /// errored. Returns the ids that were reconciled.
    async fn reconcile_stale_generating(&self, older_than: Duration) -> AppResult<Vec<Uuid>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(
        &self,
        course_id: Uuid,
        file_name: String,
        data: Vec<u8>,
    ) -> AppResult<DocumentMeta>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>>;

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<DocumentMeta>>;

    async fn set_summary(&self, id: Uuid, summary: &str) -> AppResult<()>;

    /// Number of documents in the course that still have a null summary.
    /// Re-evaluated against the database on every summarization completion.
    async fn unsummarized_count(&self, course_id: Uuid) -> AppResult<i64>;
}
