pub mod service;

pub use service::CourseService;
