/// Domain entity for per-module lessons.
use crate::modules::course::domain::value_objects::GenerationStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lesson keyed by (course, module position). Created on first lesson
/// request; the video fields are owned by the video stage.
#[derive(Debug, Clone, Serialize)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub module_index: i32,
    pub content: String,
    pub video_status: GenerationStatus,
    pub video_path: Option<String>,
    pub video_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
