/// Pipeline coordination across the generation stages.
///
/// No queue or scheduler process: the status columns in the database carry
/// the state machines, and every transition that must happen exactly once
/// goes through a conditional-update claim in a repository. Any number of
/// coordinator calls may race; the database decides the winner.
use crate::modules::assessment::domain::repository::QuestionRepository;
use crate::modules::course::domain::entities::Course;
use crate::modules::course::domain::repository::{CourseRepository, DocumentRepository};
use crate::modules::lesson::domain::repository::LessonRepository;
use crate::modules::pipeline::questions::QuestionSynthesizer;
use crate::modules::pipeline::summarizer::Summarizer;
use crate::modules::pipeline::synthesis::ModuleSynthesizer;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_info, log_warn};
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

const SYNTHESIS_FAILED_MESSAGE: &str = "Failed to generate course modules";

pub struct PipelineCoordinator {
    courses: Arc<dyn CourseRepository>,
    documents: Arc<dyn DocumentRepository>,
    questions: Arc<dyn QuestionRepository>,
    lessons: Arc<dyn LessonRepository>,
    summarizer: Arc<Summarizer>,
    synthesizer: Arc<ModuleSynthesizer>,
    question_synth: Arc<QuestionSynthesizer>,
}

impl PipelineCoordinator {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        documents: Arc<dyn DocumentRepository>,
        questions: Arc<dyn QuestionRepository>,
        lessons: Arc<dyn LessonRepository>,
        summarizer: Arc<Summarizer>,
        synthesizer: Arc<ModuleSynthesizer>,
        question_synth: Arc<QuestionSynthesizer>,
    ) -> Self {
        Self {
            courses,
            documents,
            questions,
            lessons,
            summarizer,
            synthesizer,
            question_synth,
        }
    }

    /// Summarize one uploaded document and persist the result, then check
    /// whether the course became ready for module synthesis.
    ///
    /// The summary write always happens: extraction and completion failures
    /// arrive here as sentinel strings, which still count as "summarized"
    /// so one broken document cannot stall the course forever.
    pub async fn summarize_document(&self, document_id: Uuid) -> AppResult<()> {
        let document = self
            .documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", document_id)))?;

        let summary = self
            .summarizer
            .summarize(document.data, &document.file_name)
            .await;
        self.documents.set_summary(document_id, &summary).await?;

        self.check_course_ready(document.course_id).await
    }

    /// Trigger point re-evaluated after every summarization: once no
    /// document of the course lacks a summary, attempt the generation
    /// claim. Losing the claim is the normal outcome for all but one of N
    /// concurrent completions.
    pub async fn check_course_ready(&self, course_id: Uuid) -> AppResult<()> {
        let remaining = self.documents.unsummarized_count(course_id).await?;
        if remaining > 0 {
            log_debug!(
                "Course {} still has {} documents to summarize",
                course_id,
                remaining
            );
            return Ok(());
        }

        if !self.courses.try_begin_module_generation(course_id).await? {
            log_debug!("Course {} generation already claimed or finished", course_id);
            return Ok(());
        }

        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;

        self.run_module_synthesis(&course).await
    }

    /// Explicit generation request, the path for courses without documents
    /// where no summarization completion ever fires. Returns whether this
    /// call started generation.
    pub async fn request_module_generation(&self, course_id: Uuid) -> AppResult<bool> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;

        let remaining = self.documents.unsummarized_count(course_id).await?;
        if remaining > 0 {
            return Err(AppError::InvalidInput(format!(
                "{} documents are still being summarized",
                remaining
            )));
        }

        if !self.courses.try_begin_module_generation(course_id).await? {
            return Ok(false);
        }

        self.run_module_synthesis(&course).await?;
        Ok(true)
    }

    /// Re-run module generation for a course in a terminal state.
    ///
    /// The restart claims `generating` before anything else, and the
    /// dependent questions and lessons (keyed by module position, which the
    /// new plan may reshuffle) are deleted while that claim is held. A
    /// concurrent trigger therefore cannot start a fresh cycle whose output
    /// the deletes would destroy.
    pub async fn retry_module_generation(&self, course_id: Uuid) -> AppResult<()> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;

        if !self.courses.try_restart_module_generation(course_id).await? {
            return Err(AppError::InvalidInput(
                "Module generation is already in progress".to_string(),
            ));
        }

        let dropped_questions = self.questions.delete_for_course(course_id).await?;
        let dropped_lessons = self.lessons.delete_for_course(course_id).await?;
        log_info!(
            "Retrying course {}: dropped {} questions, {} lessons",
            course_id,
            dropped_questions,
            dropped_lessons
        );

        let course = Course {
            modules: Vec::new(),
            modules_error: None,
            ..course
        };
        self.run_module_synthesis(&course).await
    }

    /// Mark rows stuck in `generating` past the threshold as errored, for
    /// both course modules and lesson videos. Runs at startup, before any
    /// new claim can be confused with an orphaned one.
    pub async fn reconcile_stale(&self, older_than: Duration) -> AppResult<(usize, usize)> {
        let courses = self.courses.reconcile_stale_generating(older_than).await?;
        for id in &courses {
            log_warn!("Reconciled interrupted module generation for course {}", id);
        }

        let lessons = self.lessons.reconcile_stale_generating(older_than).await?;
        for id in &lessons {
            log_warn!("Reconciled interrupted video generation for lesson {}", id);
        }

        Ok((courses.len(), lessons.len()))
    }

    /// Module synthesis followed by best-effort question generation.
    ///
    /// The caller must already hold the generation claim. Question failures
    /// never revert a completed course: modules stand on their own and
    /// questions can be regenerated by a later retry.
    async fn run_module_synthesis(&self, course: &Course) -> AppResult<()> {
        let summaries: Vec<(String, Option<String>)> = self
            .documents
            .list_for_course(course.id)
            .await?
            .into_iter()
            .map(|doc| (doc.file_name, doc.summary))
            .collect();

        let modules = self
            .synthesizer
            .generate(&course.name, course.description.as_deref(), &summaries)
            .await;

        if modules.is_empty() {
            self.courses
                .fail_module_generation(course.id, SYNTHESIS_FAILED_MESSAGE)
                .await?;
            return Ok(());
        }

        self.courses
            .complete_module_generation(course.id, &modules)
            .await?;
        log_info!(
            "Course {} completed with {} modules",
            course.id,
            modules.len()
        );

        let questions = self.question_synth.generate_for_course(&modules).await;
        if questions.is_empty() {
            log_warn!("No questions generated for course {}", course.id);
            return Ok(());
        }

        match self.questions.insert_many(course.id, &questions).await {
            Ok(stored) => log_info!("Stored {} questions for course {}", stored, course.id),
            Err(e) => log_warn!("Failed to store questions for course {}: {}", course.id, e),
        }

        Ok(())
    }
}
