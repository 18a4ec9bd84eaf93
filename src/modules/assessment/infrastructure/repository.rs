/// Diesel-based implementations of QuestionRepository and AttemptRepository.
use crate::modules::assessment::domain::entities::{
    LeaderboardEntry, NewQuestion, Question, TestAttempt,
};
use crate::modules::assessment::domain::repository::{AttemptRepository, QuestionRepository};
use crate::modules::assessment::infrastructure::models::{
    AttemptModel, NewAnswer, NewAttempt, NewQuestionRow, QuestionModel,
};
use crate::schema::{answers, questions, test_attempts};
use crate::shared::database::DbPool;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

/// Row shape for the leaderboard aggregate query.
#[derive(QueryableByName)]
struct LeaderboardRow {
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    user_id: Uuid,
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    name: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    total_courses: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    completed_courses: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    total_modules_passed: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    rank: i64,
}

pub struct QuestionRepositoryImpl {
    pool: DbPool,
}

impl QuestionRepositoryImpl {
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
impl QuestionRepository for QuestionRepositoryImpl {
    async fn insert_many(&self, course_id: Uuid, batch: &[NewQuestion]) -> AppResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;

        let rows: Vec<NewQuestionRow> = batch
            .iter()
            .map(|q| {
                Ok(NewQuestionRow {
                    course_id,
                    module_index: q.module_index,
                    question_text: q.question_text.clone(),
                    options: serde_json::to_value(&q.options)?,
                    correct_answer_index: q.correct_answer_index,
                })
            })
            .collect::<AppResult<_>>()?;

        let inserted = diesel::insert_into(questions::table)
            .values(&rows)
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to store questions: {}", e)))?;

        Ok(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Question>> {
        let mut conn = self.get_conn()?;

        let model: Option<QuestionModel> = questions::table
            .find(id)
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get question: {}", e)))?;

        model.map(QuestionModel::into_question).transpose()
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Question>> {
        let mut conn = self.get_conn()?;

        let models: Vec<QuestionModel> = questions::table
            .filter(questions::course_id.eq(course_id))
            .order((questions::module_index.asc(), questions::created_at.asc()))
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to list questions: {}", e)))?;

        models
            .into_iter()
            .map(QuestionModel::into_question)
            .collect()
    }

    async fn delete_for_course(&self, course_id: Uuid) -> AppResult<usize> {
        let mut conn = self.get_conn()?;

        let deleted = diesel::delete(questions::table.filter(questions::course_id.eq(course_id)))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete questions: {}", e)))?;

        Ok(deleted)
    }
}

pub struct AttemptRepositoryImpl {
    pool: DbPool,
}

impl AttemptRepositoryImpl {
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
impl AttemptRepository for AttemptRepositoryImpl {
    async fn create(&self, user_id: Uuid, course_id: Uuid) -> AppResult<TestAttempt> {
        let mut conn = self.get_conn()?;

        let inserted: AttemptModel = diesel::insert_into(test_attempts::table)
            .values(&NewAttempt {
                user_id,
                course_id,
                completed: false,
            })
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to create attempt: {}", e)))?;

        Ok(inserted.into_attempt())
    }

    async fn latest_incomplete(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<TestAttempt>> {
        let mut conn = self.get_conn()?;

        let model: Option<AttemptModel> = test_attempts::table
            .filter(test_attempts::user_id.eq(user_id))
            .filter(test_attempts::course_id.eq(course_id))
            .filter(test_attempts::completed.eq(false))
            .order(test_attempts::created_at.desc())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get attempt: {}", e)))?;

        Ok(model.map(AttemptModel::into_attempt))
    }

    async fn latest_completed(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<TestAttempt>> {
        let mut conn = self.get_conn()?;

        let model: Option<AttemptModel> = test_attempts::table
            .filter(test_attempts::user_id.eq(user_id))
            .filter(test_attempts::course_id.eq(course_id))
            .filter(test_attempts::completed.eq(true))
            .order(test_attempts::created_at.desc())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get attempt: {}", e)))?;

        Ok(model.map(AttemptModel::into_attempt))
    }

    async fn mark_completed(&self, attempt_id: Uuid) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::update(test_attempts::table.find(attempt_id))
            .set(test_attempts::completed.eq(true))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to complete attempt: {}", e)))?;

        Ok(())
    }

    async fn record_answer(
        &self,
        attempt_id: Uuid,
        question_id: Uuid,
        selected_option_index: i32,
        is_correct: bool,
    ) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::insert_into(answers::table)
            .values(&NewAnswer {
                attempt_id,
                question_id,
                selected_option_index,
                is_correct,
            })
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to record answer: {}", e)))?;

        Ok(())
    }

    async fn answers_with_modules(&self, attempt_id: Uuid) -> AppResult<Vec<(i32, bool)>> {
        let mut conn = self.get_conn()?;

        let pairs: Vec<(i32, bool)> = answers::table
            .inner_join(questions::table)
            .filter(answers::attempt_id.eq(attempt_id))
            .select((questions::module_index, answers::is_correct))
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to load answers: {}", e)))?;

        Ok(pairs)
    }

    async fn leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>> {
        let mut conn = self.get_conn()?;

        // A module counts as passed for a user when some completed attempt
        // answered every question of that (course, module) correctly.
        let rows: Vec<LeaderboardRow> = diesel::sql_query(
            r#"
            WITH attempt_module_totals AS (
                SELECT ta.id AS attempt_id,
                       ta.user_id,
                       ta.course_id,
                       q.module_index,
                       COUNT(*) AS answered,
                       COUNT(*) FILTER (WHERE a.is_correct) AS correct
                FROM test_attempts ta
                JOIN answers a ON a.attempt_id = ta.id
                JOIN questions q ON q.id = a.question_id
                WHERE ta.completed = TRUE
                GROUP BY ta.id, ta.user_id, ta.course_id, q.module_index
            ),
            user_module_passes AS (
                SELECT DISTINCT amt.user_id, amt.course_id, amt.module_index
                FROM attempt_module_totals amt
                WHERE amt.correct = amt.answered
                  AND amt.answered = (
                      SELECT COUNT(*) FROM questions q2
                      WHERE q2.course_id = amt.course_id
                        AND q2.module_index = amt.module_index
                  )
            ),
            user_stats AS (
                SELECT u.id AS user_id,
                       u.name,
                       COUNT(DISTINCT c.id) AS total_courses,
                       COUNT(DISTINCT CASE WHEN ta.completed THEN ta.course_id END) AS completed_courses,
                       (SELECT COUNT(*) FROM user_module_passes ump WHERE ump.user_id = u.id) AS total_modules_passed
                FROM users u
                LEFT JOIN courses c ON c.user_id = u.id
                LEFT JOIN test_attempts ta ON ta.user_id = u.id
                GROUP BY u.id, u.name
            )
            SELECT user_id,
                   name,
                   total_courses,
                   completed_courses,
                   total_modules_passed,
                   RANK() OVER (
                       ORDER BY completed_courses DESC,
                                total_modules_passed DESC,
                                total_courses DESC
                   ) AS rank
            FROM user_stats
            ORDER BY rank
            "#,
        )
        .load(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to load leaderboard: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|r| LeaderboardEntry {
                user_id: r.user_id,
                name: r.name,
                total_courses: r.total_courses,
                completed_courses: r.completed_courses,
                total_modules_passed: r.total_modules_passed,
                rank: r.rank,
            })
            .collect())
    }
}
