/// Tutor module
///
/// Per-module AI learning coach: a conversational assistant grounded in the
/// content of one course module. Stateless on the server; the caller carries
/// the conversation history. Streaming delivery belongs to the transport
/// layer and is out of scope here.
pub mod service;

pub use service::TutorService;
