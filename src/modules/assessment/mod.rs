/// Assessment module
///
/// Generated quiz questions, knowledge-test attempts with the "unsure"
/// sentinel answer, per-module pass calculation and the leaderboard.
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::service::AssessmentService;
pub use domain::{
    entities::{
        AnswerSubmission, LeaderboardEntry, ModuleResult, NewQuestion, Question, TestAttempt,
        TestQuestion, TestResult, TestStatus, UNSURE_ANSWER,
    },
    repository::{AttemptRepository, QuestionRepository},
};
pub use infrastructure::{AttemptRepositoryImpl, QuestionRepositoryImpl};
