pub mod entities;
pub mod repository;
pub mod value_objects;

pub use entities::{Course, CourseModule, Document, DocumentMeta};
pub use repository::{CourseRepository, DocumentRepository};
pub use value_objects::{GenerationStatus, GenerationStatusDb};
