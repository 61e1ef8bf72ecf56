//! Shared fakes for wizard integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use testflow_core::{
    ApiError, MemoryStateStore, Question, StatePersistence, StorageError, Test, TestId,
    TestResultSubmission, TestScore, TestService,
};
use tokio::sync::Barrier;

// ============================================================================
// Catalog builders
// ============================================================================

pub fn question(id: u64, option_count: usize) -> Question {
    Question {
        id,
        question: format!("Question {id}"),
        options: (1..=option_count).map(|i| format!("Option {i}")).collect(),
        correct_answer: Some(0),
    }
}

pub fn test(id: TestId, title: &str, question_ids: &[u64]) -> Test {
    Test {
        id,
        title: title.to_string(),
        questions: question_ids.iter().map(|&q| question(q, 5)).collect(),
    }
}

/// T1 with one question, T2 with two.
pub fn two_test_catalog() -> Vec<Test> {
    vec![test(1, "T1", &[1]), test(2, "T2", &[1, 2])]
}

// ============================================================================
// Fake test service
// ============================================================================

/// In-memory test service. Clones share state so a test can keep a handle
/// after moving one into the controller.
#[derive(Clone, Default)]
pub struct FakeTestService {
    pub catalog: Arc<Mutex<Option<Vec<Test>>>>,
    pub submissions: Arc<Mutex<Vec<TestResultSubmission>>>,
    pub fail_submissions: Arc<Mutex<bool>>,
    pub scores: Arc<Mutex<Vec<(TestId, f64)>>>,
    pub failing_scores: Arc<Mutex<Vec<TestId>>>,
    /// When set, every score fetch waits here; only a concurrent fan-out
    /// gets past it.
    pub score_barrier: Option<Arc<Barrier>>,
}

impl FakeTestService {
    pub fn with_catalog(tests: Vec<Test>) -> Self {
        let svc = Self::default();
        *svc.catalog.lock().unwrap() = Some(tests);
        svc
    }

    /// Catalog requests fail.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set_catalog(&self, tests: Vec<Test>) {
        *self.catalog.lock().unwrap() = Some(tests);
    }

    pub fn set_score(&self, test_id: TestId, percentage: f64) {
        self.scores.lock().unwrap().push((test_id, percentage));
    }

    pub fn fail_score_for(&self, test_id: TestId) {
        self.failing_scores.lock().unwrap().push(test_id);
    }

    pub fn set_fail_submissions(&self, fail: bool) {
        *self.fail_submissions.lock().unwrap() = fail;
    }

    pub fn submissions(&self) -> Vec<TestResultSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

impl TestService for FakeTestService {
    async fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        let catalog = self.catalog.lock().unwrap().clone();
        catalog.ok_or(ApiError::Status {
            status: 503,
            body: "unavailable".into(),
        })
    }

    async fn get_test(&self, test_id: TestId) -> Result<Test, ApiError> {
        let catalog = self.catalog.lock().unwrap().clone().unwrap_or_default();
        catalog
            .into_iter()
            .find(|t| t.id == test_id)
            .ok_or_else(|| ApiError::NotFound(format!("tests/{test_id}")))
    }

    async fn submit_result(&self, submission: &TestResultSubmission) -> Result<(), ApiError> {
        let fail = *self.fail_submissions.lock().unwrap();
        if fail {
            return Err(ApiError::Status {
                status: 500,
                body: "write failed".into(),
            });
        }
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn fetch_score(&self, user_id: &str, test_id: TestId) -> Result<TestScore, ApiError> {
        if let Some(barrier) = &self.score_barrier {
            barrier.wait().await;
        }
        let failing = self.failing_scores.lock().unwrap().contains(&test_id);
        if failing {
            return Err(ApiError::Status {
                status: 500,
                body: "scoring failed".into(),
            });
        }
        let percentage = self
            .scores
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _)| *id == test_id)
            .map(|(_, p)| *p)
            .ok_or_else(|| ApiError::NotFound(format!("results/{user_id}/{test_id}")))?;
        Ok(TestScore {
            percentage,
            score: None,
            test_id: Some(test_id),
            user_id: Some(user_id.to_string()),
            date: None,
        })
    }

    async fn download_pdf(&self, _user_id: &str, _test_id: TestId) -> Result<Vec<u8>, ApiError> {
        Ok(b"%PDF-1.4\n".to_vec())
    }
}

// ============================================================================
// Failing state store
// ============================================================================

/// In-memory store whose writes and clears can be made to fail.
#[derive(Default)]
pub struct FailingStateStore {
    pub inner: MemoryStateStore,
    pub fail_saves: Mutex<bool>,
    pub fail_clear: Mutex<bool>,
}

impl FailingStateStore {
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock().unwrap() = fail;
    }

    pub fn set_fail_clear(&self, fail: bool) {
        *self.fail_clear.lock().unwrap() = fail;
    }

    fn disk_error() -> StorageError {
        StorageError::DataDir(std::io::Error::other("disk full"))
    }
}

impl StatePersistence for FailingStateStore {
    fn load_state(&self) -> Result<Option<String>, StorageError> {
        self.inner.load_state()
    }

    fn save_state(&self, blob: &str) -> Result<(), StorageError> {
        if *self.fail_saves.lock().unwrap() {
            return Err(Self::disk_error());
        }
        self.inner.save_state(blob)
    }

    fn clear_state(&self) -> Result<(), StorageError> {
        if *self.fail_clear.lock().unwrap() {
            return Err(Self::disk_error());
        }
        self.inner.clear_state()
    }
}
