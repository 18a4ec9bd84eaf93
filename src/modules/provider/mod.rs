/// External collaborators consumed by the pipeline.
///
/// Each collaborator is a trait so the pipeline can be exercised without
/// network, toolchain binaries or API keys; the default implementations
/// talk to the real services.
pub mod extractor;
pub mod llm;
pub mod speech;

pub use extractor::{ExtractionPool, PdftotextExtractor, TextExtractor};
pub use llm::{AnthropicClient, ChatMessage, ChatRole, CompletionClient};
pub use speech::{HttpTtsClient, SpeechSynthesizer};
