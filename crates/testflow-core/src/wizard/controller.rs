//! Wizard state controller.
//!
//! Single source of truth for navigation, answers, identity and transient
//! load/error status. All I/O goes through the [`TestService`] and
//! [`StatePersistence`] ports.
//!
//! ## Step Transitions
//!
//! ```text
//! 0 (identity) -> 1..=N (tests, one submission each) -> N+1 (results)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut wizard = WizardController::new(service, store);
//! wizard.initialize().await?;
//! wizard.set_user_data(UserDataUpdate::FirstName("Anna".into()));
//! wizard.set_user_data(UserDataUpdate::LastName("Petrova".into()));
//! wizard.advance_from_identity()?;
//! wizard.record_answer(test_id, question_id, 2);
//! wizard.submit_current_test().await?;
//! ```
//!
//! Async operations are split into `begin_*` / `complete_*` so a caller that
//! drives requests itself can still hand completions back. A completion whose
//! session ticket no longer matches (reset happened, identity changed) is
//! dropped without touching state.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;

use super::state::{step_labels, AnswerMap, Step, WizardState};
use super::submission::build_submission;
use crate::api::TestService;
use crate::error::{ApiError, WizardError};
use crate::events::{Event, UiCue};
use crate::model::{
    QuestionId, Test, TestId, TestOutcome, TestResultSubmission, TestScore, UserData, UserDataUpdate,
};
use crate::storage::StatePersistence;

const DEFAULT_SCROLL_DELAY: Duration = Duration::from_millis(300);

/// Identifies the session an in-flight request was started in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    generation: u64,
    user_id: String,
}

/// A submission whose request is in flight.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    ticket: SessionTicket,
    step: usize,
    payload: TestResultSubmission,
}

impl PendingSubmission {
    pub fn payload(&self) -> &TestResultSubmission {
        &self.payload
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

/// A results fan-out whose requests are in flight.
#[derive(Debug, Clone)]
pub struct PendingResults {
    ticket: SessionTicket,
    user_id: String,
    tests: Vec<(TestId, String)>,
}

impl PendingResults {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn test_ids(&self) -> impl Iterator<Item = TestId> + '_ {
        self.tests.iter().map(|(id, _)| *id)
    }
}

pub struct WizardController<S, P> {
    service: S,
    store: P,
    state: WizardState,
    tests: Vec<Test>,
    initialized: bool,
    loading: bool,
    error: Option<String>,
    results: Option<Vec<TestOutcome>>,
    /// Persisted state has been read (or deliberately skipped).
    hydrated: bool,
    restored: bool,
    generation: u64,
    cues: Vec<UiCue>,
    scroll_delay: Duration,
}

impl<S: TestService, P: StatePersistence> WizardController<S, P> {
    /// Fresh controller: step 0, no answers, new identity, nothing loaded.
    pub fn new(service: S, store: P) -> Self {
        Self {
            service,
            store,
            state: WizardState::fresh(),
            tests: Vec::new(),
            initialized: false,
            loading: false,
            error: None,
            results: None,
            hydrated: false,
            restored: false,
            generation: 0,
            cues: Vec::new(),
            scroll_delay: DEFAULT_SCROLL_DELAY,
        }
    }

    pub fn with_scroll_delay(mut self, delay: Duration) -> Self {
        self.scroll_delay = delay;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn active_step(&self) -> usize {
        self.state.active_step
    }

    pub fn current_step(&self) -> Step {
        Step::classify(self.state.active_step, self.tests.len())
    }

    /// The test shown on the active step, if it is a test step.
    pub fn current_test(&self) -> Option<&Test> {
        match self.current_step() {
            Step::Test(i) => self.tests.get(i),
            _ => None,
        }
    }

    pub fn user_data(&self) -> &UserData {
        &self.state.user_data
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.state.test_answers
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.state
            .completed_steps
            .iter()
            .filter(|(_, done)| **done)
            .map(|(step, _)| *step)
    }

    pub fn is_step_completed(&self, step: usize) -> bool {
        self.state.is_step_completed(step)
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Tests have arrived at least once; step UI may be shown.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Progress was restored from an earlier session.
    pub fn was_restored(&self) -> bool {
        self.restored
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn results(&self) -> Option<&[TestOutcome]> {
        self.results.as_deref()
    }

    pub fn step_labels(&self) -> Vec<String> {
        step_labels(&self.tests)
    }

    pub fn is_current_test_complete(&self) -> bool {
        self.current_test()
            .is_some_and(|t| self.state.test_answers.is_test_complete(t))
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Drain presentation cues queued by transitions.
    pub fn take_cues(&mut self) -> Vec<UiCue> {
        std::mem::take(&mut self.cues)
    }

    // ── Initialization ───────────────────────────────────────────────

    /// Restore persisted progress (first call only) and fetch the catalog.
    ///
    /// May be called again after a [`WizardError::CatalogLoad`] to retry.
    /// Refused with [`WizardError::Busy`] while another request is pending.
    pub async fn initialize(&mut self) -> Result<Event, WizardError> {
        if self.loading {
            return Err(WizardError::Busy);
        }
        self.loading = true;
        if !self.hydrated {
            self.hydrate();
        }

        let fetched = self.service.list_tests().await;
        self.loading = false;

        match fetched {
            Ok(tests) => {
                tracing::info!(tests = tests.len(), "test catalog loaded");
                if self.restored && self.state.reconcile(&tests) {
                    self.restored = false;
                }
                self.tests = tests;
                self.initialized = true;
                self.error = None;
                self.persist();
                Ok(Event::Initialized {
                    test_count: self.tests.len(),
                    restored: self.restored,
                    active_step: self.state.active_step,
                    at: Utc::now(),
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load test catalog");
                Err(self.fail(WizardError::CatalogLoad))
            }
        }
    }

    fn hydrate(&mut self) {
        self.hydrated = true;
        let blob = match self.store.load_state() {
            Ok(Some(blob)) => blob,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved progress, starting fresh");
                return;
            }
        };
        match WizardState::from_json(&blob) {
            Ok(state) => {
                tracing::debug!(active_step = state.active_step, "restored saved progress");
                self.state = state;
                self.restored = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, "saved progress is corrupt, starting fresh");
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Edit one identity field. Never touches answers, step or `user_id`.
    pub fn set_user_data(&mut self, update: UserDataUpdate) {
        self.state.user_data.apply(update);
        self.persist();
    }

    pub fn replace_user_data(&mut self, first_name: &str, last_name: &str, middle_name: &str) {
        let user = &mut self.state.user_data;
        user.apply(UserDataUpdate::FirstName(first_name.to_string()));
        user.apply(UserDataUpdate::LastName(last_name.to_string()));
        user.apply(UserDataUpdate::MiddleName(middle_name.to_string()));
        self.persist();
    }

    /// Step 0 -> 1 once first and last name are filled in.
    pub fn advance_from_identity(&mut self) -> Result<Event, WizardError> {
        if !self.initialized {
            return Err(WizardError::NotInitialized);
        }
        let step = self.state.active_step;
        if step != 0 {
            return Err(WizardError::NotOnIdentityStep { step });
        }
        if !self.state.user_data.is_complete() {
            return Err(WizardError::IdentityIncomplete);
        }
        self.state.active_step = 1;
        self.persist();
        Ok(Event::StepAdvanced {
            from_step: 0,
            to_step: 1,
            at: Utc::now(),
        })
    }

    /// Upsert the selected 0-based option. Always succeeds.
    pub fn record_answer(&mut self, test_id: TestId, question_id: QuestionId, option: usize) {
        self.state.test_answers.record(test_id, question_id, option);
        self.persist();
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Validate the active test step and build its payload.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, WizardError> {
        if !self.initialized {
            return Err(WizardError::NotInitialized);
        }
        if self.loading {
            return Err(WizardError::Busy);
        }
        let step = self.state.active_step;
        let test = self
            .current_test()
            .ok_or(WizardError::NotOnTestStep { step })?;
        if !self.state.test_answers.is_test_complete(test) {
            return Err(WizardError::TestIncomplete { test_id: test.id });
        }
        let payload = build_submission(&self.state.user_data, test, &self.state.test_answers);
        self.loading = true;
        Ok(PendingSubmission {
            ticket: self.ticket(),
            step,
            payload,
        })
    }

    /// Apply the outcome of a submission request.
    ///
    /// Returns `Ok(None)` when the completion is stale and was ignored. On
    /// failure the step and answers stay as they were so the user can retry.
    pub fn complete_submission(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<(), ApiError>,
    ) -> Result<Option<Event>, WizardError> {
        if !self.is_current(&pending.ticket) || self.state.active_step != pending.step {
            tracing::debug!(step = pending.step, "ignoring stale submission result");
            return Ok(None);
        }
        self.loading = false;

        if let Err(e) = outcome {
            tracing::error!(error = %e, test_id = pending.payload.test_id, "submission failed");
            return Err(self.fail(WizardError::Submission));
        }

        let step = pending.step;
        self.state.mark_completed(step);
        self.state.active_step = step + 1;
        self.error = None;
        self.persist();
        self.cues.push(UiCue::ScrollToTop {
            delay: self.scroll_delay,
        });
        tracing::info!(test_id = pending.payload.test_id, step, "test submitted");
        Ok(Some(Event::TestSubmitted {
            test_id: pending.payload.test_id,
            step,
            next_step: step + 1,
            at: Utc::now(),
        }))
    }

    /// Submit the active test and advance on success.
    pub async fn submit_current_test(&mut self) -> Result<Option<Event>, WizardError> {
        let pending = self.begin_submission()?;
        let outcome = self.service.submit_result(&pending.payload).await;
        self.complete_submission(pending, outcome)
    }

    // ── Results ──────────────────────────────────────────────────────

    pub fn begin_results(&mut self) -> Result<PendingResults, WizardError> {
        if !self.initialized {
            return Err(WizardError::NotInitialized);
        }
        if self.loading {
            return Err(WizardError::Busy);
        }
        let step = self.state.active_step;
        if self.current_step() != Step::Results {
            return Err(WizardError::NotOnResultsStep { step });
        }
        self.loading = true;
        self.results = None;
        Ok(PendingResults {
            ticket: self.ticket(),
            user_id: self.state.user_data.user_id.clone(),
            tests: self.tests.iter().map(|t| (t.id, t.title.clone())).collect(),
        })
    }

    /// Apply the settled per-test fetches, in the order of `pending`.
    ///
    /// Any failure discards every score; results are all or nothing.
    pub fn complete_results(
        &mut self,
        pending: PendingResults,
        outcomes: Vec<Result<TestScore, ApiError>>,
    ) -> Result<Option<Event>, WizardError> {
        if !self.is_current(&pending.ticket) {
            tracing::debug!("ignoring stale results");
            return Ok(None);
        }
        self.loading = false;

        let mut scores = Vec::with_capacity(outcomes.len());
        let mut failed = outcomes.len() != pending.tests.len();
        for ((test_id, _), outcome) in pending.tests.iter().zip(outcomes) {
            match outcome {
                Ok(score) => scores.push(score),
                Err(e) => {
                    tracing::error!(error = %e, test_id, "failed to fetch result");
                    failed = true;
                }
            }
        }
        if failed {
            self.results = None;
            return Err(self.fail(WizardError::ResultsAggregation));
        }

        let outcomes: Vec<TestOutcome> = pending
            .tests
            .into_iter()
            .zip(scores)
            .map(|((test_id, title), score)| TestOutcome {
                test_id,
                title,
                percentage: score.percentage,
            })
            .collect();
        let test_count = outcomes.len();
        self.results = Some(outcomes);
        self.error = None;
        Ok(Some(Event::ResultsLoaded {
            test_count,
            at: Utc::now(),
        }))
    }

    /// Fetch every test's score concurrently; render only if all succeed.
    pub async fn load_results(&mut self) -> Result<Option<Event>, WizardError> {
        let pending = self.begin_results()?;
        let outcomes = join_all(
            pending
                .tests
                .iter()
                .map(|(test_id, _)| self.service.fetch_score(&pending.user_id, *test_id)),
        )
        .await;
        self.complete_results(pending, outcomes)
    }

    /// Download the PDF report for a submitted test.
    pub async fn download_pdf(&mut self, test_id: TestId) -> Result<Vec<u8>, WizardError> {
        let submitted = self
            .tests
            .iter()
            .position(|t| t.id == test_id)
            .is_some_and(|i| self.state.is_step_completed(i + 1));
        if !submitted {
            return Err(WizardError::TestNotSubmitted { test_id });
        }
        match self
            .service
            .download_pdf(&self.state.user_data.user_id, test_id)
            .await
        {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(error = %e, test_id, "pdf download failed");
                Err(self.fail(WizardError::PdfDownload))
            }
        }
    }

    // ── Reset ────────────────────────────────────────────────────────

    /// Clear saved progress and return to a pristine state with a new
    /// identity. Requests still in flight will be ignored when they land.
    ///
    /// Confirmation is the caller's job; this always resets.
    pub fn reset(&mut self) -> Event {
        self.generation += 1;
        self.state = WizardState::fresh();
        self.tests.clear();
        self.initialized = false;
        self.loading = false;
        self.error = None;
        self.results = None;
        self.restored = false;
        // The fresh in-memory state wins over anything left in the store.
        self.hydrated = true;
        self.cues.clear();
        if let Err(e) = self.store.clear_state() {
            tracing::warn!(error = %e, "failed to clear saved progress");
            self.error = Some(WizardError::Persistence.to_string());
        }
        tracing::info!("wizard reset");
        Event::WizardReset { at: Utc::now() }
    }

    /// Reset, then fetch the catalog again.
    pub async fn reset_and_reload(&mut self) -> Result<Event, WizardError> {
        self.reset();
        self.initialize().await
    }

    // ── Internals ────────────────────────────────────────────────────

    fn ticket(&self) -> SessionTicket {
        SessionTicket {
            generation: self.generation,
            user_id: self.state.user_data.user_id.clone(),
        }
    }

    fn is_current(&self, ticket: &SessionTicket) -> bool {
        ticket.generation == self.generation && ticket.user_id == self.state.user_data.user_id
    }

    fn fail(&mut self, err: WizardError) -> WizardError {
        self.error = Some(err.to_string());
        err
    }

    /// Write the state synchronously. No-op until the catalog has loaded.
    ///
    /// A successful write clears an earlier save failure.
    fn persist(&mut self) {
        if !self.initialized {
            return;
        }
        let written = self
            .state
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|blob| self.store.save_state(&blob).map_err(|e| e.to_string()));
        let persistence_error = WizardError::Persistence.to_string();
        match written {
            Ok(()) => {
                if self.error.as_deref() == Some(persistence_error.as_str()) {
                    self.error = None;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save progress");
                self.error = Some(persistence_error);
            }
        }
    }
}
