pub mod service;

pub use service::LessonService;
