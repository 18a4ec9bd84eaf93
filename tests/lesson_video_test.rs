//! Lazy video generation through the lesson service: idempotent kicks,
//! failure recording and explicit retries.
mod utils;

use coursegen::modules::course::domain::entities::CourseModule;
use coursegen::modules::course::domain::value_objects::GenerationStatus;
use coursegen::modules::lesson::application::service::LessonService;
use coursegen::modules::lesson::domain::repository::LessonRepository;
use coursegen::modules::lesson::video::generator::VideoGenerator;
use coursegen::shared::errors::AppError;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use utils::fakes::{CountingRenderer, FileSpeech, InMemoryCourses, InMemoryLessons, ScriptedLlm};
use uuid::Uuid;

struct Harness {
    service: LessonService,
    lessons: Arc<InMemoryLessons>,
    renderer: Arc<CountingRenderer>,
    course_id: Uuid,
}

fn harness(renderer: CountingRenderer) -> Harness {
    let (courses, course_id) = InMemoryCourses::with_course("Rust", None);
    courses.set_modules(
        course_id,
        vec![
            CourseModule {
                name: "Ownership".to_string(),
                content: "Moves and borrows".to_string(),
            },
            CourseModule {
                name: "Traits".to_string(),
                content: "Shared behavior".to_string(),
            },
        ],
    );

    let lessons = Arc::new(InMemoryLessons::new());
    let renderer = Arc::new(renderer);
    let generator = Arc::new(VideoGenerator::with_output_dir(
        Arc::new(ScriptedLlm::new()),
        Arc::new(FileSpeech),
        renderer.clone(),
        std::env::temp_dir().join(format!("lesson-videos-{}", Uuid::new_v4())),
    ));

    Harness {
        service: LessonService::new(Arc::new(courses), lessons.clone(), generator),
        lessons,
        renderer,
        course_id,
    }
}

async fn wait_for_terminal(h: &Harness, module_index: i32) -> GenerationStatus {
    for _ in 0..200 {
        let lesson = h
            .lessons
            .find(h.course_id, module_index)
            .await
            .unwrap()
            .unwrap();
        if lesson.video_status.is_terminal() {
            return lesson.video_status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("video generation never reached a terminal state");
}

#[tokio::test]
async fn repeated_fetches_render_once() {
    let h = harness(CountingRenderer::new());

    let first = h.service.get_lesson(h.course_id, 0).await.unwrap();
    assert_eq!(first.content, "Moves and borrows");
    assert_eq!(first.video_status, GenerationStatus::Generating);

    // Second fetch while generation is (or may still be) running must not
    // start another render.
    let second = h.service.get_lesson(h.course_id, 0).await.unwrap();
    assert_ne!(second.video_status, GenerationStatus::Pending);

    assert_eq!(wait_for_terminal(&h, 0).await, GenerationStatus::Completed);
    assert_eq!(h.renderer.render_calls.load(Ordering::SeqCst), 1);

    let done = h.lessons.find(h.course_id, 0).await.unwrap().unwrap();
    assert!(done.video_path.as_deref().unwrap().ends_with("0.mp4"));

    // Fetching after completion is a plain read.
    let after = h.service.get_lesson(h.course_id, 0).await.unwrap();
    assert_eq!(after.video_status, GenerationStatus::Completed);
    assert_eq!(h.renderer.render_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn render_failure_is_recorded_and_retry_recovers() {
    let h = harness(CountingRenderer::failing_first(1));

    h.service.get_lesson(h.course_id, 0).await.unwrap();
    assert_eq!(wait_for_terminal(&h, 0).await, GenerationStatus::Error);

    let failed = h.lessons.find(h.course_id, 0).await.unwrap().unwrap();
    assert!(failed.video_error.is_some());
    assert!(failed.video_path.is_none());

    // Retry restarts the whole pipeline from the narration script.
    h.service.retry_video(h.course_id, 0).await.unwrap();
    assert_eq!(wait_for_terminal(&h, 0).await, GenerationStatus::Completed);
    assert_eq!(h.renderer.render_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn lessons_are_independent_per_module() {
    let h = harness(CountingRenderer::new());

    h.service.get_lesson(h.course_id, 0).await.unwrap();
    h.service.get_lesson(h.course_id, 1).await.unwrap();

    assert_eq!(wait_for_terminal(&h, 0).await, GenerationStatus::Completed);
    assert_eq!(wait_for_terminal(&h, 1).await, GenerationStatus::Completed);
    assert_eq!(h.renderer.render_calls.load(Ordering::SeqCst), 2);

    let second = h.lessons.find(h.course_id, 1).await.unwrap().unwrap();
    assert_eq!(second.content, "Shared behavior");
    assert!(second.video_path.as_deref().unwrap().ends_with("1.mp4"));
}

#[tokio::test]
async fn unknown_module_is_not_found() {
    let h = harness(CountingRenderer::new());

    let err = h.service.get_lesson(h.course_id, 7).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = h.service.retry_video(h.course_id, 7).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn retry_while_generating_is_rejected() {
    let h = harness(CountingRenderer::new());

    h.service.get_lesson(h.course_id, 0).await.unwrap();

    // Force the in-progress state deterministically: retry is only legal
    // from a terminal state.
    let lesson = h.lessons.find(h.course_id, 0).await.unwrap().unwrap();
    if lesson.video_status == GenerationStatus::Generating {
        let err = h.service.retry_video(h.course_id, 0).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    wait_for_terminal(&h, 0).await;
}
