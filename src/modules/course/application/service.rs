/// Course management and document uploads.
///
/// Upload returns as soon as the document row is stored; summarization and
/// everything downstream runs as a background task through the pipeline
/// coordinator.
use crate::modules::course::domain::entities::{Course, DocumentMeta};
use crate::modules::course::domain::repository::{CourseRepository, DocumentRepository};
use crate::modules::pipeline::PipelineCoordinator;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_error, log_info};
use std::sync::Arc;
use uuid::Uuid;

pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    documents: Arc<dyn DocumentRepository>,
    coordinator: Arc<PipelineCoordinator>,
}

impl CourseService {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        documents: Arc<dyn DocumentRepository>,
        coordinator: Arc<PipelineCoordinator>,
    ) -> Self {
        Self {
            courses,
            documents,
            coordinator,
        }
    }

    pub async fn create_course(
        &self,
        user_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<Course> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidInput(
                "Course name cannot be empty".to_string(),
            ));
        }

        let course = self.courses.create(user_id, name, description).await?;
        log_info!(
            "Created course {} '{}' for user {}",
            course.id,
            course.name,
            course.user_id
        );
        Ok(course)
    }

    pub async fn get_course(&self, id: Uuid) -> AppResult<Course> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))
    }

    pub async fn list_courses(&self) -> AppResult<Vec<Course>> {
        self.courses.get_all().await
    }

    pub async fn delete_course(&self, id: Uuid) -> AppResult<()> {
        self.courses.delete(id).await
    }

    pub async fn list_documents(&self, course_id: Uuid) -> AppResult<Vec<DocumentMeta>> {
        self.get_course(course_id).await?;
        self.documents.list_for_course(course_id).await
    }

    /// Store an uploaded PDF and kick off its summarization in the
    /// background. The returned metadata has no summary yet.
    pub async fn upload_document(
        &self,
        course_id: Uuid,
        file_name: String,
        data: Vec<u8>,
    ) -> AppResult<DocumentMeta> {
        self.get_course(course_id).await?;

        if !file_name.to_lowercase().ends_with(".pdf") {
            return Err(AppError::InvalidInput(
                "Only PDF files are supported".to_string(),
            ));
        }
        if data.is_empty() {
            return Err(AppError::InvalidInput(
                "Uploaded file is empty".to_string(),
            ));
        }

        let meta = self.documents.insert(course_id, file_name, data).await?;
        log_info!(
            "Stored document {} '{}' for course {}",
            meta.id,
            meta.file_name,
            course_id
        );

        let coordinator = self.coordinator.clone();
        let document_id = meta.id;
        tokio::spawn(async move {
            if let Err(e) = coordinator.summarize_document(document_id).await {
                log_error!("Summarization task failed for document {}: {}", document_id, e);
            }
        });

        Ok(meta)
    }

    /// Explicitly request module generation, the entry point for courses
    /// without uploaded documents. Returns whether generation started.
    pub async fn generate_modules(&self, course_id: Uuid) -> AppResult<bool> {
        self.coordinator.request_module_generation(course_id).await
    }

    /// Regenerate a course's modules from scratch, discarding its
    /// questions and lessons.
    pub async fn retry_generation(&self, course_id: Uuid) -> AppResult<()> {
        self.coordinator.retry_module_generation(course_id).await
    }
}
