//! Data contracts shared between the controller, the test service and the
//! presentation layer.
//!
//! Wire and persisted JSON use camelCase keys.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TestId = u64;
pub type QuestionId = u64;

/// Respondent identity.
///
/// `user_id` is generated once per session and never rewritten by updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Empty when not given.
    #[serde(default)]
    pub middle_name: String,
    pub user_id: String,
}

/// A single identity field edit coming from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDataUpdate {
    FirstName(String),
    LastName(String),
    MiddleName(String),
}

impl UserData {
    /// Blank names with a newly generated identifier.
    pub fn fresh() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            middle_name: String::new(),
            user_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn apply(&mut self, update: UserDataUpdate) {
        match update {
            UserDataUpdate::FirstName(v) => self.first_name = v,
            UserDataUpdate::LastName(v) => self.last_name = v,
            UserDataUpdate::MiddleName(v) => self.middle_name = v,
        }
    }

    /// First and last name are required; middle name is optional.
    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }

    pub fn display_name(&self) -> String {
        [&self.last_name, &self.first_name, &self.middle_name]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Scoring happens server-side; the client never reads this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: TestId,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Test {
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// `GET /tests` envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCatalog {
    #[serde(default)]
    pub tests: Vec<Test>,
}

/// `POST /results` body.
///
/// `answers` holds 1-based option numbers. `score` and `date` are filled in by
/// the server and stay `None` on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultSubmission {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub test_id: TestId,
    pub answers: BTreeMap<QuestionId, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// `GET /results/{userId}/{testId}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestScore {
    pub percentage: f64,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub test_id: Option<TestId>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// One results card on the final step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub test_id: TestId,
    pub title: String,
    pub percentage: f64,
}
