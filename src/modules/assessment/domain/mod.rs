pub mod entities;
pub mod repository;

pub use entities::{
    summarize_module_results, AnswerSubmission, LeaderboardEntry, ModuleResult, NewQuestion,
    Question, TestAttempt, TestQuestion, TestResult, TestStatus, UNSURE_ANSWER,
};
pub use repository::{AttemptRepository, QuestionRepository};
