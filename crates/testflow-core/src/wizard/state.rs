//! Persisted wizard state.
//!
//! [`WizardState`] is the unit of persistence. It serializes to
//! `{userData, testAnswers, activeStep, completedSteps}` and must survive a
//! save/restore cycle unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{QuestionId, Test, TestId, UserData};

/// Selected 0-based option per question, grouped by test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<TestId, BTreeMap<QuestionId, usize>>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert. The last write for a (test, question) pair wins.
    pub fn record(&mut self, test_id: TestId, question_id: QuestionId, option: usize) {
        self.0.entry(test_id).or_default().insert(question_id, option);
    }

    pub fn answers_for(&self, test_id: TestId) -> Option<&BTreeMap<QuestionId, usize>> {
        self.0.get(&test_id)
    }

    pub fn get(&self, test_id: TestId, question_id: QuestionId) -> Option<usize> {
        self.0.get(&test_id)?.get(&question_id).copied()
    }

    /// True iff every question of `test` has an answer.
    pub fn is_test_complete(&self, test: &Test) -> bool {
        let answers = self.0.get(&test.id);
        test.questions
            .iter()
            .all(|q| answers.is_some_and(|a| a.contains_key(&q.id)))
    }

    pub fn answered_count(&self, test_id: TestId) -> usize {
        self.0.get(&test_id).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TestId, &BTreeMap<QuestionId, usize>)> {
        self.0.iter()
    }
}

/// Position of a step index relative to a catalog of `N` tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Step 0.
    Identity,
    /// Steps 1..=N; carries the 0-based catalog index.
    Test(usize),
    /// Step N+1.
    Results,
    OutOfRange,
}

impl Step {
    pub fn classify(index: usize, test_count: usize) -> Self {
        match index {
            0 => Step::Identity,
            i if i <= test_count => Step::Test(i - 1),
            i if i == test_count + 1 => Step::Results,
            _ => Step::OutOfRange,
        }
    }
}

/// Stepper labels: identity, one per test, then the finish step.
pub fn step_labels(tests: &[Test]) -> Vec<String> {
    std::iter::once("Personal data".to_string())
        .chain(tests.iter().map(|t| t.title.clone()))
        .chain(std::iter::once("Finish".to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub user_data: UserData,
    #[serde(default)]
    pub test_answers: AnswerMap,
    #[serde(default)]
    pub active_step: usize,
    /// Submitted steps, stored as `{"<step>": true}`.
    #[serde(default)]
    pub completed_steps: BTreeMap<usize, bool>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::fresh()
    }
}

impl WizardState {
    /// Step 0, no answers, newly generated identity.
    pub fn fresh() -> Self {
        Self {
            user_data: UserData::fresh(),
            test_answers: AnswerMap::new(),
            active_step: 0,
            completed_steps: BTreeMap::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_step_completed(&self, step: usize) -> bool {
        self.completed_steps.get(&step).copied().unwrap_or(false)
    }

    pub fn mark_completed(&mut self, step: usize) {
        self.completed_steps.insert(step, true);
    }

    /// Check a restored state against the current catalog.
    ///
    /// Returns the reason when the state references steps, tests, questions
    /// or options the catalog does not have, or when the completed steps do
    /// not line up with the active step. Steps before the active one must be
    /// submitted with every question answered; no later step may be.
    pub fn mismatch(&self, tests: &[Test]) -> Option<String> {
        let n = tests.len();
        if self.active_step > n + 1 {
            return Some(format!("active step {} beyond {} tests", self.active_step, n));
        }
        if let Some(step) = self
            .completed_steps
            .keys()
            .find(|&&s| s == 0 || s > n)
        {
            return Some(format!("completed step {step} is not a test step"));
        }
        for (test_id, answers) in self.test_answers.iter() {
            let Some(test) = tests.iter().find(|t| t.id == *test_id) else {
                return Some(format!("answers for unknown test {test_id}"));
            };
            for (question_id, option) in answers {
                match test.question(*question_id) {
                    None => {
                        return Some(format!(
                            "answer for unknown question {question_id} in test {test_id}"
                        ))
                    }
                    Some(q) if *option >= q.options.len() => {
                        return Some(format!(
                            "option {option} out of range for question {question_id}"
                        ))
                    }
                    Some(_) => {}
                }
            }
        }
        for step in 1..self.active_step {
            if !self.is_step_completed(step) {
                return Some(format!(
                    "step {step} before active step {} was never submitted",
                    self.active_step
                ));
            }
        }
        for step in self.completed() {
            if step >= self.active_step {
                return Some(format!(
                    "step {step} is completed but active step is {}",
                    self.active_step
                ));
            }
            if !self.test_answers.is_test_complete(&tests[step - 1]) {
                return Some(format!(
                    "completed step {step} has unanswered questions for test {}",
                    tests[step - 1].id
                ));
            }
        }
        None
    }

    fn completed(&self) -> impl Iterator<Item = usize> + '_ {
        self.completed_steps
            .iter()
            .filter(|(_, done)| **done)
            .map(|(step, _)| *step)
    }

    /// Drop progress that does not fit `tests`, keeping the identity.
    ///
    /// Returns true when progress was discarded.
    pub fn reconcile(&mut self, tests: &[Test]) -> bool {
        match self.mismatch(tests) {
            Some(reason) => {
                tracing::warn!(%reason, "restored progress does not match test catalog, discarding");
                self.test_answers = AnswerMap::new();
                self.active_step = 0;
                self.completed_steps.clear();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn test_with(id: TestId, questions: &[QuestionId]) -> Test {
        Test {
            id,
            title: format!("Test {id}"),
            questions: questions
                .iter()
                .map(|&q| Question {
                    id: q,
                    question: format!("Q{q}"),
                    options: vec!["a".into(), "b".into(), "c".into()],
                    correct_answer: None,
                })
                .collect(),
        }
    }

    #[test]
    fn record_overwrites_previous_choice() {
        let mut answers = AnswerMap::new();
        answers.record(1, 10, 0);
        answers.record(1, 10, 2);
        answers.record(1, 10, 2);
        assert_eq!(answers.get(1, 10), Some(2));
        assert_eq!(answers.answered_count(1), 1);
    }

    #[test]
    fn completeness_needs_every_question() {
        let test = test_with(1, &[10, 11]);
        let mut answers = AnswerMap::new();
        assert!(!answers.is_test_complete(&test));
        answers.record(1, 10, 0);
        assert!(!answers.is_test_complete(&test));
        answers.record(2, 11, 0);
        assert!(!answers.is_test_complete(&test));
        answers.record(1, 11, 1);
        assert!(answers.is_test_complete(&test));
    }

    #[test]
    fn test_without_questions_is_complete() {
        assert!(AnswerMap::new().is_test_complete(&test_with(3, &[])));
    }

    #[test]
    fn classify_steps() {
        assert_eq!(Step::classify(0, 2), Step::Identity);
        assert_eq!(Step::classify(1, 2), Step::Test(0));
        assert_eq!(Step::classify(2, 2), Step::Test(1));
        assert_eq!(Step::classify(3, 2), Step::Results);
        assert_eq!(Step::classify(4, 2), Step::OutOfRange);
    }

    #[test]
    fn labels_wrap_test_titles() {
        let labels = step_labels(&[test_with(1, &[1]), test_with(2, &[1])]);
        assert_eq!(labels, vec!["Personal data", "Test 1", "Test 2", "Finish"]);
    }

    #[test]
    fn persisted_shape_uses_camel_case_keys() {
        let mut state = WizardState::fresh();
        state.test_answers.record(5, 1, 2);
        state.active_step = 1;
        state.mark_completed(1);
        let json: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
        assert_eq!(json["activeStep"], 1);
        assert_eq!(json["completedSteps"]["1"], true);
        assert_eq!(json["testAnswers"]["5"]["1"], 2);
        assert!(json["userData"]["userId"].is_string());
    }

    #[test]
    fn reads_blob_written_by_browser_client() {
        let blob = r#"{"userData":{"firstName":"Anna","lastName":"Petrova","middleName":"",
            "userId":"0b6f"},"testAnswers":{"1":{"1":0}},"activeStep":2,
            "completedSteps":{"1":true}}"#;
        let state = WizardState::from_json(blob).unwrap();
        assert_eq!(state.active_step, 2);
        assert_eq!(state.test_answers.get(1, 1), Some(0));
        assert!(state.is_step_completed(1));
        assert!(!state.is_step_completed(2));
    }

    #[test]
    fn reconcile_keeps_matching_progress() {
        let tests = vec![test_with(1, &[1]), test_with(2, &[1, 2])];
        let mut state = WizardState::fresh();
        state.test_answers.record(1, 1, 2);
        state.active_step = 2;
        state.mark_completed(1);
        let before = state.clone();
        assert!(!state.reconcile(&tests));
        assert_eq!(state, before);
    }

    #[test]
    fn reconcile_discards_stale_progress_but_keeps_identity() {
        let tests = vec![test_with(1, &[1])];
        let mut state = WizardState::fresh();
        state.test_answers.record(9, 1, 0);
        state.active_step = 1;
        let user = state.user_data.clone();
        assert!(state.reconcile(&tests));
        assert_eq!(state.active_step, 0);
        assert!(state.test_answers.is_empty());
        assert_eq!(state.user_data, user);
    }

    #[test]
    fn mismatch_detects_out_of_range_values() {
        let tests = vec![test_with(1, &[1])];
        let mut state = WizardState::fresh();
        state.active_step = 3;
        assert!(state.mismatch(&tests).is_some());

        let mut state = WizardState::fresh();
        state.mark_completed(2);
        assert!(state.mismatch(&tests).is_some());

        let mut state = WizardState::fresh();
        state.test_answers.record(1, 1, 3);
        assert!(state.mismatch(&tests).is_some());
    }

    #[test]
    fn mismatch_detects_skipped_or_misplaced_submissions() {
        let tests = vec![test_with(1, &[1]), test_with(2, &[1, 2])];

        // Results step with nothing submitted.
        let mut state = WizardState::fresh();
        state.active_step = 3;
        assert!(state.mismatch(&tests).is_some());

        // Completed step at or after the active one.
        let mut state = WizardState::fresh();
        state.test_answers.record(1, 1, 0);
        state.active_step = 1;
        state.mark_completed(1);
        assert!(state.mismatch(&tests).is_some());

        // Completed step whose test is not fully answered.
        let mut state = WizardState::fresh();
        state.test_answers.record(2, 1, 0);
        state.active_step = 2;
        state.mark_completed(1);
        assert!(state.mismatch(&tests).is_some());

        // A `false` entry does not count as submitted.
        let mut state = WizardState::fresh();
        state.test_answers.record(1, 1, 0);
        state.active_step = 2;
        state.completed_steps.insert(1, false);
        assert!(state.mismatch(&tests).is_some());
    }
}
