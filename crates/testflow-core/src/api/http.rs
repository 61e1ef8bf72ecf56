//! HTTP adapter for the remote test service.
//!
//! All endpoints live under one base URL (default
//! `http://localhost:8080/api`) and exchange JSON, except the PDF download.

use std::time::Duration;

use reqwest::{Client, Response};
use url::Url;

use super::TestService;
use crate::error::ApiError;
use crate::model::{Test, TestCatalog, TestId, TestResultSubmission, TestScore};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

pub struct HttpTestService {
    client: Client,
    base: Url,
}

impl HttpTestService {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL does not parse or the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: normalize_base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn result_path(user_id: &str, test_id: TestId) -> String {
        format!("results/{}/{}", urlencoding::encode(user_id), test_id)
    }
}

/// Joining relative paths needs the base to end in `/`.
fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
    let trimmed = base_url.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    if status.as_u16() == 404 {
        return Err(ApiError::NotFound(url));
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

impl TestService for HttpTestService {
    async fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        let url = self.endpoint("tests")?;
        tracing::debug!(%url, "fetching test catalog");
        let resp = check_status(self.client.get(url).send().await?).await?;
        let catalog: TestCatalog = resp.json().await?;
        Ok(catalog.tests)
    }

    async fn get_test(&self, test_id: TestId) -> Result<Test, ApiError> {
        let url = self.endpoint(&format!("tests/{test_id}"))?;
        let resp = check_status(self.client.get(url).send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn submit_result(&self, submission: &TestResultSubmission) -> Result<(), ApiError> {
        let url = self.endpoint("results")?;
        tracing::debug!(%url, test_id = submission.test_id, "submitting result");
        check_status(self.client.post(url).json(submission).send().await?).await?;
        Ok(())
    }

    async fn fetch_score(&self, user_id: &str, test_id: TestId) -> Result<TestScore, ApiError> {
        let url = self.endpoint(&Self::result_path(user_id, test_id))?;
        let resp = check_status(self.client.get(url).send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn download_pdf(&self, user_id: &str, test_id: TestId) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&format!("{}/pdf", Self::result_path(user_id, test_id)))?;
        let resp = check_status(self.client.get(url).send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}
