/// Diesel models for the lessons table.
use crate::modules::course::domain::value_objects::GenerationStatusDb;
use crate::modules::lesson::domain::entities::Lesson;
use crate::schema::lessons;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = lessons)]
pub struct LessonModel {
    pub id: Uuid,
    pub course_id: Uuid,
    pub module_index: i32,
    pub content: String,
    pub video_status: GenerationStatusDb,
    pub video_path: Option<String>,
    pub video_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LessonModel {
    pub fn into_lesson(self) -> Lesson {
        Lesson {
            id: self.id,
            course_id: self.course_id,
            module_index: self.module_index,
            content: self.content,
            video_status: self.video_status.into(),
            video_path: self.video_path,
            video_error: self.video_error,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = lessons)]
pub struct NewLesson<'a> {
    pub course_id: Uuid,
    pub module_index: i32,
    pub content: &'a str,
}
