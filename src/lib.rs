pub mod modules;
mod schema;
pub mod shared;

use modules::{
    assessment::{
        application::service::AssessmentService,
        infrastructure::{AttemptRepositoryImpl, QuestionRepositoryImpl},
        AttemptRepository, QuestionRepository,
    },
    course::{
        application::service::CourseService,
        infrastructure::{CourseRepositoryImpl, DocumentRepositoryImpl},
        CourseRepository, DocumentRepository,
    },
    lesson::{
        application::service::LessonService, infrastructure::LessonRepositoryImpl,
        video::{generator::VideoGenerator, renderer::ManimRenderer},
        LessonRepository,
    },
    pipeline::{ModuleSynthesizer, PipelineCoordinator, QuestionSynthesizer, Summarizer},
    provider::{
        extractor::{ExtractionPool, PdftotextExtractor},
        llm::AnthropicClient,
        speech::HttpTtsClient,
    },
    tutor::TutorService,
};
use shared::errors::AppResult;
use shared::Database;
use std::sync::Arc;

/// How long a `generating` row may sit untouched before startup
/// reconciliation marks it errored.
const STALE_GENERATION_SECS: i64 = 30 * 60;

/// Fully wired application: pool, repositories, pipeline and services.
///
/// Construction order matters only in that the coordinator is shared by the
/// course service (uploads trigger summarization) while holding its own
/// repository handles.
pub struct AppContext {
    pub database: Arc<Database>,
    pub coordinator: Arc<PipelineCoordinator>,
    pub course_service: Arc<CourseService>,
    pub lesson_service: Arc<LessonService>,
    pub assessment_service: Arc<AssessmentService>,
    pub tutor_service: Arc<TutorService>,
}

impl AppContext {
    /// Build the full dependency graph from environment configuration,
    /// run pending migrations and reconcile work interrupted by a previous
    /// shutdown.
    pub async fn initialize() -> AppResult<Self> {
        let database = Arc::new(Database::new()?);
        run_migrations(&database)?;

        let context = Self::from_database(database)?;

        let (stale_courses, stale_lessons) = context
            .coordinator
            .reconcile_stale(chrono::Duration::seconds(STALE_GENERATION_SECS))
            .await?;
        if stale_courses > 0 || stale_lessons > 0 {
            log_warn!(
                "Startup reconciliation: {} courses, {} lessons marked errored",
                stale_courses,
                stale_lessons
            );
        }

        Ok(context)
    }

    /// Wire repositories and services onto an existing database handle.
    pub fn from_database(database: Arc<Database>) -> AppResult<Self> {
        let pool = database.pool().clone();

        let courses: Arc<dyn CourseRepository> =
            Arc::new(CourseRepositoryImpl::new(pool.clone()));
        let documents: Arc<dyn DocumentRepository> =
            Arc::new(DocumentRepositoryImpl::new(pool.clone()));
        let questions: Arc<dyn QuestionRepository> =
            Arc::new(QuestionRepositoryImpl::new(pool.clone()));
        let attempts: Arc<dyn AttemptRepository> =
            Arc::new(AttemptRepositoryImpl::new(pool.clone()));
        let lessons: Arc<dyn LessonRepository> = Arc::new(LessonRepositoryImpl::new(pool));

        let llm = Arc::new(AnthropicClient::new()?);
        let extraction = Arc::new(ExtractionPool::new(Arc::new(PdftotextExtractor)));

        let coordinator = Arc::new(PipelineCoordinator::new(
            Arc::clone(&courses),
            Arc::clone(&documents),
            Arc::clone(&questions),
            Arc::clone(&lessons),
            Arc::new(Summarizer::new(llm.clone(), extraction)),
            Arc::new(ModuleSynthesizer::new(llm.clone())),
            Arc::new(QuestionSynthesizer::new(llm.clone())),
        ));

        let course_service = Arc::new(CourseService::new(
            Arc::clone(&courses),
            Arc::clone(&documents),
            Arc::clone(&coordinator),
        ));

        let tutor_service = Arc::new(TutorService::new(Arc::clone(&courses), llm.clone()));

        let video = Arc::new(VideoGenerator::new(
            llm,
            Arc::new(HttpTtsClient::new()?),
            Arc::new(ManimRenderer::new()),
        ));
        let lesson_service = Arc::new(LessonService::new(
            Arc::clone(&courses),
            Arc::clone(&lessons),
            video,
        ));

        let assessment_service = Arc::new(AssessmentService::new(courses, questions, attempts));

        Ok(Self {
            database,
            coordinator,
            course_service,
            lesson_service,
            assessment_service,
            tutor_service,
        })
    }
}

fn run_migrations(database: &Database) -> AppResult<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let mut conn = database.get_connection()?;
    conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
        shared::errors::AppError::DatabaseError(format!("Failed to run migrations: {}", e))
    })?;

    log_info!("Database migrations up to date");
    Ok(())
}
