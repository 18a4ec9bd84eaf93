/// Domain entities for quiz questions and knowledge-test attempts.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Sentinel option index meaning "I'm unsure"; always graded incorrect.
pub const UNSURE_ANSWER: i32 = -1;

/// Question accepted from the synthesis stage, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub module_index: i32,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: i32,
}

/// Persisted quiz question. Read-only after generation.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: Uuid,
    pub course_id: Uuid,
    pub module_index: i32,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: i32,
}

impl Question {
    /// Grade a submitted option index. The unsure sentinel is incorrect
    /// unconditionally, regardless of the correct answer.
    pub fn grade(&self, selected_option_index: i32) -> bool {
        selected_option_index != UNSURE_ANSWER
            && selected_option_index == self.correct_answer_index
    }
}

/// Question as handed to a test taker: the correct answer never leaves the
/// backend.
#[derive(Debug, Clone, Serialize)]
pub struct TestQuestion {
    pub id: Uuid,
    pub module_index: i32,
    pub question_text: String,
    pub options: Vec<String>,
}

impl From<Question> for TestQuestion {
    fn from(q: Question) -> Self {
        TestQuestion {
            id: q.id,
            module_index: q.module_index,
            question_text: q.question_text,
            options: q.options,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: Uuid,
    pub selected_option_index: i32,
}

#[derive(Debug, Clone)]
pub struct TestAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-module tally for one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleResult {
    pub total: usize,
    pub correct: usize,
}

impl ModuleResult {
    /// A module is passed iff every one of its questions in the attempt
    /// was answered correctly.
    pub fn passed(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub attempt_id: Uuid,
    pub module_results: BTreeMap<i32, ModuleResult>,
    pub passed_modules: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestStatus {
    pub has_completed: bool,
    pub module_results: BTreeMap<i32, ModuleResult>,
    pub passed_modules: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub total_courses: i64,
    pub completed_courses: i64,
    pub total_modules_passed: i64,
    pub rank: i64,
}

/// Collapse (module_index, is_correct) pairs into per-module tallies and
/// the passed-module list.
pub fn summarize_module_results(
    answers: impl IntoIterator<Item = (i32, bool)>,
) -> (BTreeMap<i32, ModuleResult>, Vec<i32>) {
    let mut results: BTreeMap<i32, ModuleResult> = BTreeMap::new();

    for (module_index, is_correct) in answers {
        let entry = results.entry(module_index).or_default();
        entry.total += 1;
        if is_correct {
            entry.correct += 1;
        }
    }

    let passed = results
        .iter()
        .filter(|(_, result)| result.passed())
        .map(|(index, _)| *index)
        .collect();

    (results, passed)
}
