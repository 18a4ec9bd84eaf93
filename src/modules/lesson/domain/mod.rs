pub mod entities;
pub mod repository;

pub use entities::Lesson;
pub use repository::LessonRepository;
