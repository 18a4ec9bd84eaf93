/// Diesel models for the courses and documents tables.
use crate::modules::course::domain::entities::{Course, CourseModule, Document, DocumentMeta};
use crate::modules::course::domain::value_objects::GenerationStatusDb;
use crate::schema::{courses, documents};
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = courses)]
pub struct NewCourse {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Queryable, Selectable, QueryableByName, Debug, Clone)]
#[diesel(table_name = courses)]
pub struct CourseModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub modules: JsonValue,
    pub modules_status: GenerationStatusDb,
    pub modules_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseModel {
    /// Convert to domain Course, parsing the denormalized module list.
    /// The column is only ever written from a validated `Vec<CourseModule>`,
    /// so a parse failure here indicates corruption and surfaces as an error.
    pub fn into_course(self) -> AppResult<Course> {
        let modules: Vec<CourseModule> = serde_json::from_value(self.modules)
            .map_err(|e| AppError::SerializationError(format!("Corrupt module list: {}", e)))?;

        Ok(Course {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            modules,
            modules_status: self.modules_status.into(),
            modules_error: self.modules_error,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub course_id: Uuid,
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = documents)]
pub struct DocumentModel {
    pub id: Uuid,
    pub course_id: Uuid,
    pub file_name: String,
    pub data: Vec<u8>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DocumentModel {
    pub fn into_document(self) -> Document {
        Document {
            id: self.id,
            course_id: self.course_id,
            file_name: self.file_name,
            data: self.data,
            summary: self.summary,
            created_at: self.created_at,
        }
    }
}

/// Projection without the raw bytes.
#[derive(Queryable, Debug)]
pub struct DocumentMetaModel {
    pub id: Uuid,
    pub course_id: Uuid,
    pub file_name: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DocumentMetaModel {
    pub fn into_meta(self) -> DocumentMeta {
        DocumentMeta {
            id: self.id,
            course_id: self.course_id,
            file_name: self.file_name,
            summary: self.summary,
            created_at: self.created_at,
        }
    }
}
