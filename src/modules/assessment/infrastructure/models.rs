/// Diesel models for the questions, test_attempts and answers tables.
use crate::modules::assessment::domain::entities::{Question, TestAttempt};
use crate::schema::{answers, questions, test_attempts};
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = questions)]
pub struct NewQuestionRow {
    pub course_id: Uuid,
    pub module_index: i32,
    pub question_text: String,
    pub options: JsonValue,
    pub correct_answer_index: i32,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = questions)]
pub struct QuestionModel {
    pub id: Uuid,
    pub course_id: Uuid,
    pub module_index: i32,
    pub question_text: String,
    pub options: JsonValue,
    pub correct_answer_index: i32,
    pub created_at: DateTime<Utc>,
}

impl QuestionModel {
    pub fn into_question(self) -> AppResult<Question> {
        let options: Vec<String> = serde_json::from_value(self.options)
            .map_err(|e| AppError::SerializationError(format!("Corrupt options: {}", e)))?;

        Ok(Question {
            id: self.id,
            course_id: self.course_id,
            module_index: self.module_index,
            question_text: self.question_text,
            options,
            correct_answer_index: self.correct_answer_index,
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = test_attempts)]
pub struct NewAttempt {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub completed: bool,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = test_attempts)]
pub struct AttemptModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl AttemptModel {
    pub fn into_attempt(self) -> TestAttempt {
        TestAttempt {
            id: self.id,
            user_id: self.user_id,
            course_id: self.course_id,
            completed: self.completed,
            created_at: self.created_at,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = answers)]
pub struct NewAnswer {
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_option_index: i32,
    pub is_correct: bool,
}
