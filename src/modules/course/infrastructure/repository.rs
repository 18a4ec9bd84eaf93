/// Diesel-based implementations of CourseRepository and DocumentRepository.
///
/// Status transitions execute as single conditional UPDATE statements so the
/// check and the write happen atomically in the database; the affected-row
/// count tells the caller whether it won the transition.
use crate::modules::course::domain::entities::{Course, CourseModule, Document, DocumentMeta};
use crate::modules::course::domain::repository::{CourseRepository, DocumentRepository};
use crate::modules::course::domain::value_objects::GenerationStatusDb;
use crate::modules::course::infrastructure::models::{
    CourseModel, DocumentMetaModel, DocumentModel, NewCourse, NewDocument,
};
use crate::schema::{courses, documents};
use crate::shared::database::DbPool;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Duration;
use diesel::prelude::*;
use uuid::Uuid;

/// Helper struct for RETURNING id queries
#[derive(QueryableByName)]
struct IdResult {
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    id: Uuid,
}

pub struct CourseRepositoryImpl {
    pool: DbPool,
}

impl CourseRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(
        &self,
    ) -> AppResult<
        diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>,
    > {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }
}

#[async_trait]
impl CourseRepository for CourseRepositoryImpl {
    async fn create(
        &self,
        user_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<Course> {
        let mut conn = self.get_conn()?;

        let inserted: CourseModel = diesel::insert_into(courses::table)
            .values(&NewCourse {
                user_id,
                name,
                description,
            })
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to create course: {}", e)))?;

        inserted.into_course()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let mut conn = self.get_conn()?;

        let course: Option<CourseModel> = courses::table
            .find(id)
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get course: {}", e)))?;

        course.map(CourseModel::into_course).transpose()
    }

    async fn get_all(&self) -> AppResult<Vec<Course>> {
        let mut conn = self.get_conn()?;

        let models: Vec<CourseModel> = courses::table
            .order(courses::created_at.asc())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to list courses: {}", e)))?;

        models.into_iter().map(CourseModel::into_course).collect()
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        let deleted = diesel::delete(courses::table.find(id))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete course: {}", e)))?;

        if deleted == 0 {
            return Err(AppError::NotFound(format!("Course {} not found", id)));
        }

        Ok(())
    }

    async fn try_begin_module_generation(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.get_conn()?;

        // Single conditional update: only a pending course can enter
        // generating, and only one concurrent caller sees an affected row.
        let affected = diesel::update(
            courses::table
                .find(id)
                .filter(courses::modules_status.eq(GenerationStatusDb::Pending)),
        )
        .set((
            courses::modules_status.eq(GenerationStatusDb::Generating),
            courses::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to claim generation: {}", e)))?;

        Ok(affected == 1)
    }

    async fn complete_module_generation(
        &self,
        id: Uuid,
        modules: &[CourseModule],
    ) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        let payload = serde_json::to_value(modules)?;

        diesel::update(courses::table.find(id))
            .set((
                courses::modules.eq(payload),
                courses::modules_status.eq(GenerationStatusDb::Completed),
                courses::modules_error.eq(None::<String>),
                courses::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to store modules: {}", e)))?;

        Ok(())
    }

    async fn fail_module_generation(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::update(courses::table.find(id))
            .set((
                courses::modules_status.eq(GenerationStatusDb::Error),
                courses::modules_error.eq(Some(error.to_string())),
                courses::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to mark generation error: {}", e))
            })?;

        Ok(())
    }

    async fn try_restart_module_generation(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.get_conn()?;

        // Retry only leaves terminal states, and it claims `generating`
        // directly: going through `pending` first would open a window for a
        // concurrent trigger to win the fresh cycle while the retry is
        // still deleting dependent rows.
        let affected = diesel::update(
            courses::table.find(id).filter(
                courses::modules_status
                    .eq(GenerationStatusDb::Completed)
                    .or(courses::modules_status.eq(GenerationStatusDb::Error)),
            ),
        )
        .set((
            courses::modules_status.eq(GenerationStatusDb::Generating),
            courses::modules_error.eq(None::<String>),
            courses::modules.eq(serde_json::json!([])),
            courses::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to restart generation: {}", e)))?;

        Ok(affected == 1)
    }

    async fn reconcile_stale_generating(&self, older_than: Duration) -> AppResult<Vec<Uuid>> {
        let mut conn = self.get_conn()?;

        let reconciled: Vec<IdResult> = diesel::sql_query(
            "UPDATE courses
             SET modules_status = 'error'::generation_status,
                 modules_error = 'Module generation interrupted; retry to regenerate',
                 updated_at = NOW()
             WHERE modules_status = 'generating'
               AND updated_at < NOW() - ($1 * INTERVAL '1 second')
             RETURNING id",
        )
        .bind::<diesel::sql_types::BigInt, _>(older_than.num_seconds())
        .load(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to reconcile courses: {}", e)))?;

        Ok(reconciled.into_iter().map(|r| r.id).collect())
    }
}

pub struct DocumentRepositoryImpl {
    pool: DbPool,
}

impl DocumentRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(
        &self,
    ) -> AppResult<
        diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>,
    > {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }
}

#[async_trait]
impl DocumentRepository for DocumentRepositoryImpl {
    async fn insert(
        &self,
        course_id: Uuid,
        file_name: String,
        data: Vec<u8>,
    ) -> AppResult<DocumentMeta> {
        let mut conn = self.get_conn()?;

        let inserted: DocumentModel = diesel::insert_into(documents::table)
            .values(&NewDocument {
                course_id,
                file_name,
                data,
            })
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to store document: {}", e)))?;

        let doc = inserted.into_document();
        Ok(DocumentMeta {
            id: doc.id,
            course_id: doc.course_id,
            file_name: doc.file_name,
            summary: doc.summary,
            created_at: doc.created_at,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        let mut conn = self.get_conn()?;

        let doc: Option<DocumentModel> = documents::table
            .find(id)
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get document: {}", e)))?;

        Ok(doc.map(DocumentModel::into_document))
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<DocumentMeta>> {
        let mut conn = self.get_conn()?;

        let metas: Vec<DocumentMetaModel> = documents::table
            .filter(documents::course_id.eq(course_id))
            .select((
                documents::id,
                documents::course_id,
                documents::file_name,
                documents::summary,
                documents::created_at,
            ))
            .order(documents::created_at.asc())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to list documents: {}", e)))?;

        Ok(metas.into_iter().map(DocumentMetaModel::into_meta).collect())
    }

    async fn set_summary(&self, id: Uuid, summary: &str) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::update(documents::table.find(id))
            .set(documents::summary.eq(summary))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to store summary: {}", e)))?;

        Ok(())
    }

    async fn unsummarized_count(&self, course_id: Uuid) -> AppResult<i64> {
        let mut conn = self.get_conn()?;

        let count: i64 = documents::table
            .filter(documents::course_id.eq(course_id))
            .filter(documents::summary.is_null())
            .count()
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to count documents: {}", e)))?;

        Ok(count)
    }
}
