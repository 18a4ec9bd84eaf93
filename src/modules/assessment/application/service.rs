/// Knowledge tests and the leaderboard.
use crate::modules::assessment::domain::entities::{
    summarize_module_results, AnswerSubmission, LeaderboardEntry, TestQuestion, TestResult,
    TestStatus,
};
use crate::modules::assessment::domain::repository::{AttemptRepository, QuestionRepository};
use crate::modules::course::domain::repository::CourseRepository;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_info};
use std::sync::Arc;
use uuid::Uuid;

pub struct AssessmentService {
    courses: Arc<dyn CourseRepository>,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl AssessmentService {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            courses,
            questions,
            attempts,
        }
    }

    async fn ensure_course_exists(&self, course_id: Uuid) -> AppResult<()> {
        if self.courses.find_by_id(course_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Course {} not found",
                course_id
            )));
        }
        Ok(())
    }

    /// All test questions for a course in module order, without correct
    /// answers.
    pub async fn course_questions(&self, course_id: Uuid) -> AppResult<Vec<TestQuestion>> {
        self.ensure_course_exists(course_id).await?;

        let questions = self.questions.list_for_course(course_id).await?;
        Ok(questions.into_iter().map(TestQuestion::from).collect())
    }

    pub async fn start_attempt(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Uuid> {
        self.ensure_course_exists(course_id).await?;

        let attempt = self.attempts.create(user_id, course_id).await?;
        log_debug!("Started attempt {} for course {}", attempt.id, course_id);
        Ok(attempt.id)
    }

    /// Grade and store a batch of answers, completing the attempt.
    ///
    /// Answers referencing unknown questions are skipped; the unsure
    /// sentinel (-1) grades incorrect regardless of the actual answer.
    pub async fn submit_attempt(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        submissions: Vec<AnswerSubmission>,
    ) -> AppResult<TestResult> {
        self.ensure_course_exists(course_id).await?;

        let attempt = match self.attempts.latest_incomplete(user_id, course_id).await? {
            Some(attempt) => attempt,
            None => self.attempts.create(user_id, course_id).await?,
        };

        let mut graded = Vec::with_capacity(submissions.len());
        for submission in submissions {
            let Some(question) = self.questions.find_by_id(submission.question_id).await? else {
                log_debug!(
                    "Skipping answer for unknown question {}",
                    submission.question_id
                );
                continue;
            };

            let is_correct = question.grade(submission.selected_option_index);
            self.attempts
                .record_answer(
                    attempt.id,
                    question.id,
                    submission.selected_option_index,
                    is_correct,
                )
                .await?;
            graded.push((question.module_index, is_correct));
        }

        self.attempts.mark_completed(attempt.id).await?;

        let (module_results, passed_modules) = summarize_module_results(graded);
        log_info!(
            "Attempt {} completed: {} modules passed",
            attempt.id,
            passed_modules.len()
        );

        Ok(TestResult {
            attempt_id: attempt.id,
            module_results,
            passed_modules,
        })
    }

    /// Completion status derived from the most recent completed attempt.
    pub async fn test_status(&self, user_id: Uuid, course_id: Uuid) -> AppResult<TestStatus> {
        self.ensure_course_exists(course_id).await?;

        let Some(attempt) = self.attempts.latest_completed(user_id, course_id).await? else {
            return Ok(TestStatus {
                has_completed: false,
                module_results: Default::default(),
                passed_modules: Vec::new(),
            });
        };

        let answers = self.attempts.answers_with_modules(attempt.id).await?;
        let (module_results, passed_modules) = summarize_module_results(answers);

        Ok(TestStatus {
            has_completed: true,
            module_results,
            passed_modules,
        })
    }

    pub async fn leaderboard(
        &self,
        current_user: Uuid,
    ) -> AppResult<(Vec<LeaderboardEntry>, Option<LeaderboardEntry>)> {
        let entries = self.attempts.leaderboard().await?;
        let current = entries.iter().find(|e| e.user_id == current_user).cloned();
        Ok((entries, current))
    }
}
