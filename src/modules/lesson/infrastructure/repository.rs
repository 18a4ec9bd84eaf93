/// Diesel-based implementation of LessonRepository.
///
/// Video status transitions follow the same conditional-UPDATE claim pattern
/// as course module generation.
use crate::modules::course::domain::value_objects::GenerationStatusDb;
use crate::modules::lesson::domain::entities::Lesson;
use crate::modules::lesson::domain::repository::LessonRepository;
use crate::modules::lesson::infrastructure::models::{LessonModel, NewLesson};
use crate::schema::lessons;
use crate::shared::database::DbPool;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Duration;
use diesel::prelude::*;
use uuid::Uuid;

#[derive(QueryableByName)]
struct IdResult {
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    id: Uuid,
}

pub struct LessonRepositoryImpl {
    pool: DbPool,
}

impl LessonRepositoryImpl {
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
impl LessonRepository for LessonRepositoryImpl {
    async fn find(&self, course_id: Uuid, module_index: i32) -> AppResult<Option<Lesson>> {
        let mut conn = self.get_conn()?;

        let lesson: Option<LessonModel> = lessons::table
            .filter(lessons::course_id.eq(course_id))
            .filter(lessons::module_index.eq(module_index))
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get lesson: {}", e)))?;

        Ok(lesson.map(LessonModel::into_lesson))
    }

    async fn get_or_create(
        &self,
        course_id: Uuid,
        module_index: i32,
        content: &str,
    ) -> AppResult<Lesson> {
        let mut conn = self.get_conn()?;

        // ON CONFLICT DO NOTHING on the (course_id, module_index) unique
        // key; concurrent first fetches all land on the same row.
        diesel::insert_into(lessons::table)
            .values(&NewLesson {
                course_id,
                module_index,
                content,
            })
            .on_conflict((lessons::course_id, lessons::module_index))
            .do_nothing()
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to create lesson: {}", e)))?;

        let lesson: LessonModel = lessons::table
            .filter(lessons::course_id.eq(course_id))
            .filter(lessons::module_index.eq(module_index))
            .first(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to get lesson: {}", e)))?;

        Ok(lesson.into_lesson())
    }

    async fn try_begin_video(&self, course_id: Uuid, module_index: i32) -> AppResult<bool> {
        let mut conn = self.get_conn()?;

        let affected = diesel::update(
            lessons::table
                .filter(lessons::course_id.eq(course_id))
                .filter(lessons::module_index.eq(module_index))
                .filter(lessons::video_status.eq(GenerationStatusDb::Pending)),
        )
        .set((
            lessons::video_status.eq(GenerationStatusDb::Generating),
            lessons::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to claim video: {}", e)))?;

        Ok(affected == 1)
    }

    async fn complete_video(
        &self,
        course_id: Uuid,
        module_index: i32,
        video_path: &str,
    ) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::update(
            lessons::table
                .filter(lessons::course_id.eq(course_id))
                .filter(lessons::module_index.eq(module_index)),
        )
        .set((
            lessons::video_status.eq(GenerationStatusDb::Completed),
            lessons::video_path.eq(Some(video_path)),
            lessons::video_error.eq(None::<String>),
            lessons::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to store video path: {}", e)))?;

        Ok(())
    }

    async fn fail_video(&self, course_id: Uuid, module_index: i32, error: &str) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::update(
            lessons::table
                .filter(lessons::course_id.eq(course_id))
                .filter(lessons::module_index.eq(module_index)),
        )
        .set((
            lessons::video_status.eq(GenerationStatusDb::Error),
            lessons::video_error.eq(Some(error)),
            lessons::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark video error: {}", e)))?;

        Ok(())
    }

    async fn reset_video(&self, course_id: Uuid, module_index: i32) -> AppResult<bool> {
        let mut conn = self.get_conn()?;

        // Retry only leaves terminal states.
        let affected = diesel::update(
            lessons::table
                .filter(lessons::course_id.eq(course_id))
                .filter(lessons::module_index.eq(module_index))
                .filter(
                    lessons::video_status
                        .eq(GenerationStatusDb::Completed)
                        .or(lessons::video_status.eq(GenerationStatusDb::Error)),
                ),
        )
        .set((
            lessons::video_status.eq(GenerationStatusDb::Pending),
            lessons::video_path.eq(None::<String>),
            lessons::video_error.eq(None::<String>),
            lessons::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to reset video: {}", e)))?;

        Ok(affected == 1)
    }

    async fn delete_for_course(&self, course_id: Uuid) -> AppResult<usize> {
        let mut conn = self.get_conn()?;

        let deleted = diesel::delete(lessons::table.filter(lessons::course_id.eq(course_id)))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete lessons: {}", e)))?;

        Ok(deleted)
    }

    async fn reconcile_stale_generating(&self, older_than: Duration) -> AppResult<Vec<Uuid>> {
        let mut conn = self.get_conn()?;

        let reconciled: Vec<IdResult> = diesel::sql_query(
            "UPDATE lessons
             SET video_status = 'error'::generation_status,
                 video_error = 'Video generation interrupted; retry to regenerate',
                 updated_at = NOW()
             WHERE video_status = 'generating'
               AND updated_at < NOW() - ($1 * INTERVAL '1 second')
             RETURNING id",
        )
        .bind::<diesel::sql_types::BigInt, _>(older_than.num_seconds())
        .load(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to reconcile lessons: {}", e)))?;

        Ok(reconciled.into_iter().map(|r| r.id).collect())
    }
}
