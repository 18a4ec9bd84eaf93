//! In-memory fakes with real claim semantics.
//!
//! The conditional-update repositories are reimplemented over mutex-guarded
//! maps so concurrency scenarios run against the same transition rules the
//! database enforces, without a database.
use async_trait::async_trait;
use chrono::{Duration, Utc};
use coursegen::modules::assessment::domain::entities::{NewQuestion, Question};
use coursegen::modules::assessment::domain::repository::QuestionRepository;
use coursegen::modules::course::domain::entities::{Course, CourseModule, Document, DocumentMeta};
use coursegen::modules::course::domain::repository::{CourseRepository, DocumentRepository};
use coursegen::modules::course::domain::value_objects::GenerationStatus;
use coursegen::modules::lesson::domain::entities::Lesson;
use coursegen::modules::lesson::domain::repository::LessonRepository;
use coursegen::modules::lesson::video::renderer::AnimationRenderer;
use coursegen::modules::provider::llm::{ChatMessage, CompletionClient};
use coursegen::modules::provider::speech::SpeechSynthesizer;
use coursegen::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub struct InMemoryCourses {
    rows: Mutex<HashMap<Uuid, Course>>,
}

impl InMemoryCourses {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_course(name: &str, description: Option<&str>) -> (Self, Uuid) {
        let repo = Self::new();
        let id = Uuid::new_v4();
        repo.rows.lock().unwrap().insert(
            id,
            Course {
                id,
                user_id: Uuid::new_v4(),
                name: name.to_string(),
                description: description.map(String::from),
                modules: Vec::new(),
                modules_status: GenerationStatus::Pending,
                modules_error: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        );
        (repo, id)
    }

    pub fn set_modules(&self, id: Uuid, modules: Vec<CourseModule>) {
        let mut rows = self.rows.lock().unwrap();
        let course = rows.get_mut(&id).unwrap();
        course.modules = modules;
        course.modules_status = GenerationStatus::Completed;
    }

    pub fn force_status(&self, id: Uuid, status: GenerationStatus) {
        self.rows.lock().unwrap().get_mut(&id).unwrap().modules_status = status;
    }

    pub fn status_of(&self, id: Uuid) -> GenerationStatus {
        self.rows.lock().unwrap()[&id].modules_status
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourses {
    async fn create(
        &self,
        user_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            user_id,
            name,
            description,
            modules: Vec::new(),
            modules_status: GenerationStatus::Pending,
            modules_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(course.id, course.clone());
        Ok(course)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn get_all(&self) -> AppResult<Vec<Course>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))
    }

    async fn try_begin_module_generation(&self, id: Uuid) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(course) if course.modules_status == GenerationStatus::Pending => {
                course.modules_status = GenerationStatus::Generating;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_module_generation(
        &self,
        id: Uuid,
        modules: &[CourseModule],
    ) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let course = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))?;
        course.modules = modules.to_vec();
        course.modules_status = GenerationStatus::Completed;
        course.modules_error = None;
        Ok(())
    }

    async fn fail_module_generation(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let course = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))?;
        course.modules_status = GenerationStatus::Error;
        course.modules_error = Some(error.to_string());
        Ok(())
    }

    async fn try_restart_module_generation(&self, id: Uuid) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(course) if course.modules_status.is_terminal() => {
                course.modules_status = GenerationStatus::Generating;
                course.modules = Vec::new();
                course.modules_error = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reconcile_stale_generating(&self, _older_than: Duration) -> AppResult<Vec<Uuid>> {
        // Age bookkeeping belongs to the database implementation; here every
        // generating row counts as stale.
        let mut rows = self.rows.lock().unwrap();
        let mut reconciled = Vec::new();
        for course in rows.values_mut() {
            if course.modules_status == GenerationStatus::Generating {
                course.modules_status = GenerationStatus::Error;
                course.modules_error =
                    Some("Module generation interrupted; retry to regenerate".to_string());
                reconciled.push(course.id);
            }
        }
        Ok(reconciled)
    }
}

pub struct InMemoryDocuments {
    rows: Mutex<HashMap<Uuid, Document>>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub fn seed(&self, course_id: Uuid, file_name: &str, data: &[u8]) -> Uuid {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().insert(
            id,
            Document {
                id,
                course_id,
                file_name: file_name.to_string(),
                data: data.to_vec(),
                summary: None,
                created_at: Utc::now(),
            },
        );
        id
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocuments {
    async fn insert(
        &self,
        course_id: Uuid,
        file_name: String,
        data: Vec<u8>,
    ) -> AppResult<DocumentMeta> {
        let id = self.seed(course_id, &file_name, &data);
        let rows = self.rows.lock().unwrap();
        let doc = &rows[&id];
        Ok(DocumentMeta {
            id,
            course_id,
            file_name: doc.file_name.clone(),
            summary: None,
            created_at: doc.created_at,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<DocumentMeta>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|doc| doc.course_id == course_id)
            .map(|doc| DocumentMeta {
                id: doc.id,
                course_id: doc.course_id,
                file_name: doc.file_name.clone(),
                summary: doc.summary.clone(),
                created_at: doc.created_at,
            })
            .collect())
    }

    async fn set_summary(&self, id: Uuid, summary: &str) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let doc = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))?;
        doc.summary = Some(summary.to_string());
        Ok(())
    }

    async fn unsummarized_count(&self, course_id: Uuid) -> AppResult<i64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|doc| doc.course_id == course_id && doc.summary.is_none())
            .count() as i64)
    }
}

pub struct InMemoryQuestions {
    rows: Mutex<Vec<Question>>,
}

impl InMemoryQuestions {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn count_for(&self, course_id: Uuid) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.course_id == course_id)
            .count()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestions {
    async fn insert_many(&self, course_id: Uuid, questions: &[NewQuestion]) -> AppResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        for question in questions {
            rows.push(Question {
                id: Uuid::new_v4(),
                course_id,
                module_index: question.module_index,
                question_text: question.question_text.clone(),
                options: question.options.clone(),
                correct_answer_index: question.correct_answer_index,
            });
        }
        Ok(questions.len())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Question>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id)
            .cloned())
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Question>> {
        let mut questions: Vec<Question> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.module_index);
        Ok(questions)
    }

    async fn delete_for_course(&self, course_id: Uuid) -> AppResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|q| q.course_id != course_id);
        Ok(before - rows.len())
    }
}

pub struct InMemoryLessons {
    rows: Mutex<HashMap<(Uuid, i32), Lesson>>,
}

impl InMemoryLessons {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl LessonRepository for InMemoryLessons {
    async fn find(&self, course_id: Uuid, module_index: i32) -> AppResult<Option<Lesson>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(course_id, module_index))
            .cloned())
    }

    async fn get_or_create(
        &self,
        course_id: Uuid,
        module_index: i32,
        content: &str,
    ) -> AppResult<Lesson> {
        let mut rows = self.rows.lock().unwrap();
        let lesson = rows
            .entry((course_id, module_index))
            .or_insert_with(|| Lesson {
                id: Uuid::new_v4(),
                course_id,
                module_index,
                content: content.to_string(),
                video_status: GenerationStatus::Pending,
                video_path: None,
                video_error: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
        Ok(lesson.clone())
    }

    async fn try_begin_video(&self, course_id: Uuid, module_index: i32) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&(course_id, module_index)) {
            Some(lesson) if lesson.video_status == GenerationStatus::Pending => {
                lesson.video_status = GenerationStatus::Generating;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_video(
        &self,
        course_id: Uuid,
        module_index: i32,
        video_path: &str,
    ) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let lesson = rows
            .get_mut(&(course_id, module_index))
            .ok_or_else(|| AppError::NotFound("lesson".to_string()))?;
        lesson.video_status = GenerationStatus::Completed;
        lesson.video_path = Some(video_path.to_string());
        lesson.video_error = None;
        Ok(())
    }

    async fn fail_video(&self, course_id: Uuid, module_index: i32, error: &str) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let lesson = rows
            .get_mut(&(course_id, module_index))
            .ok_or_else(|| AppError::NotFound("lesson".to_string()))?;
        lesson.video_status = GenerationStatus::Error;
        lesson.video_error = Some(error.to_string());
        Ok(())
    }

    async fn reset_video(&self, course_id: Uuid, module_index: i32) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&(course_id, module_index)) {
            Some(lesson) if lesson.video_status.is_terminal() => {
                lesson.video_status = GenerationStatus::Pending;
                lesson.video_path = None;
                lesson.video_error = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_for_course(&self, course_id: Uuid) -> AppResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(c, _), _| *c != course_id);
        Ok(before - rows.len())
    }

    async fn reconcile_stale_generating(&self, _older_than: Duration) -> AppResult<Vec<Uuid>> {
        let mut rows = self.rows.lock().unwrap();
        let mut reconciled = Vec::new();
        for lesson in rows.values_mut() {
            if lesson.video_status == GenerationStatus::Generating {
                lesson.video_status = GenerationStatus::Error;
                lesson.video_error =
                    Some("Video generation interrupted; retry to regenerate".to_string());
                reconciled.push(lesson.id);
            }
        }
        Ok(reconciled)
    }
}

/// Completion client scripted by prompt markers, with per-stage call
/// counters.
pub struct ScriptedLlm {
    pub summary_calls: AtomicUsize,
    pub synthesis_calls: AtomicUsize,
    pub question_calls: AtomicUsize,
    pub narration_calls: AtomicUsize,
    fail_questions: bool,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            summary_calls: AtomicUsize::new(0),
            synthesis_calls: AtomicUsize::new(0),
            question_calls: AtomicUsize::new(0),
            narration_calls: AtomicUsize::new(0),
            fail_questions: false,
        }
    }

    pub fn with_failing_questions() -> Self {
        Self {
            fail_questions: true,
            ..Self::new()
        }
    }

    fn modules_json() -> String {
        serde_json::json!([
            {"name": "Basics", "content": "Variables and types"},
            {"name": "Ownership", "content": "Moves and borrows"},
            {"name": "Traits", "content": "Shared behavior"},
            {"name": "Async", "content": "Futures and tasks"}
        ])
        .to_string()
    }

    fn questions_json() -> String {
        serde_json::json!([
            {
                "question_text": "What moves ownership?",
                "options": ["assignment", "printing", "sleeping", "nothing"],
                "correct_answer_index": 0
            }
        ])
        .to_string()
    }
}

#[async_trait]
impl CompletionClient for ScriptedLlm {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> AppResult<String> {
        if prompt.contains("curriculum designer") {
            self.synthesis_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::modules_json())
        } else if prompt.contains("assessment designer") {
            self.question_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_questions {
                Ok("no json in this response".to_string())
            } else {
                Ok(Self::questions_json())
            }
        } else if prompt.contains("narration script") {
            self.narration_calls.fetch_add(1, Ordering::SeqCst);
            Ok("Welcome to this lesson on ownership.".to_string())
        } else if prompt.contains("Manim") {
            Ok("```python\nfrom manim import *\nclass LessonScene(Scene): pass\n```".to_string())
        } else {
            self.summary_calls.fetch_add(1, Ordering::SeqCst);
            Ok("Summary of the uploaded material".to_string())
        }
    }

    async fn chat(
        &self,
        _system: &str,
        messages: &[ChatMessage],
        _max_tokens: u32,
    ) -> AppResult<String> {
        let last = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(format!("💡 Coaching reply to: {}", last))
    }
}

/// Renderer that writes placeholder files and counts invocations. Fails the
/// first `fail_first` renders.
pub struct CountingRenderer {
    pub render_calls: AtomicUsize,
    fail_first: usize,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self {
            render_calls: AtomicUsize::new(0),
            fail_first: 0,
        }
    }

    pub fn failing_first(fail_first: usize) -> Self {
        Self {
            render_calls: AtomicUsize::new(0),
            fail_first,
        }
    }
}

#[async_trait]
impl AnimationRenderer for CountingRenderer {
    async fn render(&self, _program: &str) -> AppResult<PathBuf> {
        let call = self.render_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(AppError::Timeout(
                "Animation render exceeded 300 seconds".to_string(),
            ));
        }
        let path = std::env::temp_dir().join(format!("render-{}.mp4", Uuid::new_v4()));
        tokio::fs::write(&path, b"silent").await?;
        Ok(path)
    }

    async fn merge_audio(&self, _video: &Path, _audio: &Path, output: &Path) -> AppResult<()> {
        tokio::fs::write(output, b"merged").await?;
        Ok(())
    }
}

pub struct FileSpeech;

#[async_trait]
impl SpeechSynthesizer for FileSpeech {
    async fn synthesize(&self, _text: &str) -> AppResult<PathBuf> {
        let path = std::env::temp_dir().join(format!("narration-{}.mp3", Uuid::new_v4()));
        tokio::fs::write(&path, b"mp3").await?;
        Ok(path)
    }
}
