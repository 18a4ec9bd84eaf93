/// Lesson module
///
/// Per-module teaching artifacts: lesson text derived from the module
/// content plus a lazily generated narrated video. Video generation is its
/// own {pending, generating, completed, error} state machine per
/// (course, module index), claimed through a conditional update so repeated
/// lesson fetches never start a second render.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod video;

pub use application::service::LessonService;
pub use domain::{entities::Lesson, repository::LessonRepository};
pub use infrastructure::LessonRepositoryImpl;
pub use video::{AnimationRenderer, ManimRenderer, VideoGenerator};
