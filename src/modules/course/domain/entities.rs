/// Domain entities for courses and their source documents.
use super::value_objects::GenerationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ordered unit of course content produced by module synthesis.
///
/// Modules are stored denormalized as a JSON array on the course row and
/// are immutable once written. Deserialization is the validation boundary:
/// a payload missing `name` or `content` fails as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub modules: Vec<CourseModule>,
    pub modules_status: GenerationStatus,
    pub modules_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Look up a module by its position, the key used by lessons and
    /// questions.
    pub fn module_at(&self, index: usize) -> Option<&CourseModule> {
        self.modules.get(index)
    }
}

/// Uploaded source document including raw bytes.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub course_id: Uuid,
    pub file_name: String,
    pub data: Vec<u8>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Document metadata without the raw bytes, for listings and the
/// summarized-set check.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMeta {
    pub id: Uuid,
    pub course_id: Uuid,
    pub file_name: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DocumentMeta {
    pub fn is_summarized(&self) -> bool {
        self.summary.is_some()
    }
}
