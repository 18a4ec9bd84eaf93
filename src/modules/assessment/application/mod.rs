pub mod service;

pub use service::AssessmentService;
