/// Lesson fetching and lazy video generation.
///
/// The first fetch of a lesson creates its row and kicks off video
/// generation in the background; the claim in the repository guarantees
/// concurrent fetches start at most one render. Callers poll the lesson to
/// observe the video status advancing.
use crate::modules::course::domain::repository::CourseRepository;
use crate::modules::course::domain::value_objects::GenerationStatus;
use crate::modules::lesson::domain::entities::Lesson;
use crate::modules::lesson::domain::repository::LessonRepository;
use crate::modules::lesson::video::generator::VideoGenerator;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_error, log_info};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct LessonService {
    courses: Arc<dyn CourseRepository>,
    lessons: Arc<dyn LessonRepository>,
    video: Arc<VideoGenerator>,
}

impl LessonService {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        lessons: Arc<dyn LessonRepository>,
        video: Arc<VideoGenerator>,
    ) -> Self {
        Self {
            courses,
            lessons,
            video,
        }
    }

    /// Fetch the lesson for a course module, creating it on first access
    /// and starting video generation if none has run yet.
    pub async fn get_lesson(&self, course_id: Uuid, module_index: i32) -> AppResult<Lesson> {
        let module = self.module_for(course_id, module_index).await?;

        let mut lesson = self
            .lessons
            .get_or_create(course_id, module_index, &module.1)
            .await?;

        if lesson.video_status == GenerationStatus::Pending
            && self.start_video(course_id, module_index, module).await?
        {
            lesson.video_status = GenerationStatus::Generating;
        }

        Ok(lesson)
    }

    /// Re-run video generation for a lesson in a terminal state. The
    /// pipeline restarts from the narration script; nothing from the
    /// previous run is reused.
    pub async fn retry_video(&self, course_id: Uuid, module_index: i32) -> AppResult<()> {
        let module = self.module_for(course_id, module_index).await?;

        if self.lessons.find(course_id, module_index).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "No lesson for course {} module {}",
                course_id, module_index
            )));
        }

        if !self.lessons.reset_video(course_id, module_index).await? {
            return Err(AppError::InvalidInput(
                "Video generation is already in progress".to_string(),
            ));
        }

        self.start_video(course_id, module_index, module).await?;
        Ok(())
    }

    async fn module_for(
        &self,
        course_id: Uuid,
        module_index: i32,
    ) -> AppResult<(String, String)> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;

        let index = usize::try_from(module_index)
            .map_err(|_| AppError::InvalidInput("Module index must be non-negative".to_string()))?;

        let module = course.module_at(index).ok_or_else(|| {
            AppError::NotFound(format!(
                "Course {} has no module {}",
                course_id, module_index
            ))
        })?;

        Ok((module.name.clone(), module.content.clone()))
    }

    /// Claim the video generation and run it in the background. Returns
    /// whether this caller won the claim.
    async fn start_video(
        &self,
        course_id: Uuid,
        module_index: i32,
        module: (String, String),
    ) -> AppResult<bool> {
        if !self.lessons.try_begin_video(course_id, module_index).await? {
            return Ok(false);
        }

        let service = self.clone();
        tokio::spawn(async move {
            service
                .run_video_generation(course_id, module_index, module.0, module.1)
                .await;
        });

        Ok(true)
    }

    async fn run_video_generation(
        &self,
        course_id: Uuid,
        module_index: i32,
        module_name: String,
        content: String,
    ) {
        let outcome = self
            .video
            .generate(course_id, module_index, &module_name, &content)
            .await;

        let persisted = match outcome {
            Ok(path) => {
                log_info!(
                    "Video ready for course {} module {}: {}",
                    course_id,
                    module_index,
                    path
                );
                self.lessons
                    .complete_video(course_id, module_index, &path)
                    .await
            }
            Err(e) => {
                log_error!(
                    "Video generation failed for course {} module {}: {}",
                    course_id,
                    module_index,
                    e
                );
                self.lessons
                    .fail_video(course_id, module_index, &e.to_string())
                    .await
            }
        };

        if let Err(e) = persisted {
            log_error!(
                "Failed to record video outcome for course {} module {}: {}",
                course_id,
                module_index,
                e
            );
        }
    }
}
