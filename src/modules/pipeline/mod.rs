/// Content-generation pipeline
///
/// Stages: document summarization -> module synthesis -> question synthesis.
/// The coordinator sequences them per course and guards against duplicate
/// triggering; all coordination state lives in the database status columns.
///
/// Lesson video generation is its own lazily-triggered stage under
/// `modules::lesson::video`.
pub mod coordinator;
pub mod parse;
pub mod prompts;
pub mod questions;
pub mod summarizer;
pub mod synthesis;

pub use coordinator::PipelineCoordinator;
pub use questions::QuestionSynthesizer;
pub use summarizer::Summarizer;
pub use synthesis::ModuleSynthesizer;
