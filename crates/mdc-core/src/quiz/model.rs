//! Quiz domain models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Single,
    Multiple,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    /// Indexes into `options`. Empty for text questions.
    #[serde(default)]
    pub correct_answers: Vec<usize>,
    pub points: u32,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassingScoreType {
    Percentage,
    Points,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    pub passing_score: u32,
    pub passing_score_type: PassingScoreType,
    #[serde(default)]
    pub show_answers: bool,
    #[serde(default)]
    pub requires_manual_check: bool,
    pub created_by: String,
    pub created_at: String,
}

impl Test {
    pub fn max_score(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// Fields supplied when authoring a test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    pub passing_score: u32,
    pub passing_score_type: PassingScoreType,
    #[serde(default)]
    pub show_answers: bool,
    #[serde(default)]
    pub requires_manual_check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    /// Submitted, waiting for manual review.
    Completed,
    Passed,
    Failed,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Passed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAnswer {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_options: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_answer: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub time_spent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAssignment {
    pub id: String,
    pub test_id: String,
    pub user_id: String,
    pub assigned_by: String,
    pub assigned_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub status: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub answers: Vec<TestAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    /// Question ids in the order they are presented.
    #[serde(default)]
    pub question_order: Vec<String>,
}

/// Aggregate results of one test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStatistics {
    pub assigned: usize,
    pub in_progress: usize,
    pub awaiting_review: usize,
    pub passed: usize,
    pub failed: usize,
    /// Mean score of passed and failed attempts.
    pub average_score: f64,
}
