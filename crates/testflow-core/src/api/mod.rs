//! Remote test service.
//!
//! [`TestService`] is the port the wizard controller talks through;
//! [`HttpTestService`] is the JSON-over-HTTP adapter.

pub mod http;

use std::future::Future;

use crate::error::ApiError;
use crate::model::{Test, TestId, TestResultSubmission, TestScore};

pub use http::HttpTestService;

/// Every backend the wizard can run against implements this trait.
/// Returned futures are `Send` so callers may spawn them.
pub trait TestService {
    /// `GET /tests`
    fn list_tests(&self) -> impl Future<Output = Result<Vec<Test>, ApiError>> + Send;

    /// `GET /tests/{testId}`
    fn get_test(&self, test_id: TestId) -> impl Future<Output = Result<Test, ApiError>> + Send;

    /// `POST /results`
    fn submit_result(
        &self,
        submission: &TestResultSubmission,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /results/{userId}/{testId}`
    fn fetch_score(
        &self,
        user_id: &str,
        test_id: TestId,
    ) -> impl Future<Output = Result<TestScore, ApiError>> + Send;

    /// `GET /results/{userId}/{testId}/pdf`
    fn download_pdf(
        &self,
        user_id: &str,
        test_id: TestId,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;
}
