/// Course module
///
/// Owns courses, their uploaded source documents and the generated module
/// list. The generation state machine lives on the `modules_status` column;
/// transitions are made through conditional updates in the repository.
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::service::CourseService;
pub use domain::{
    entities::{Course, CourseModule, Document, DocumentMeta},
    repository::{CourseRepository, DocumentRepository},
    value_objects::GenerationStatus,
};
pub use infrastructure::{CourseRepositoryImpl, DocumentRepositoryImpl};
