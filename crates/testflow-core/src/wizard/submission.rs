//! Building the `POST /results` payload for one test.
//!
//! Answers are stored 0-based; the service expects 1-based option numbers.
//! The shift happens here and nowhere else.

use std::collections::BTreeMap;

use crate::model::{Test, TestResultSubmission, UserData};

use super::state::AnswerMap;

/// Wire value for a stored 0-based option index.
pub fn to_wire_option(index: usize) -> usize {
    index + 1
}

pub fn build_submission(user: &UserData, test: &Test, answers: &AnswerMap) -> TestResultSubmission {
    let wire_answers: BTreeMap<_, _> = answers
        .answers_for(test.id)
        .map(|a| {
            a.iter()
                .map(|(&question_id, &option)| (question_id, to_wire_option(option)))
                .collect()
        })
        .unwrap_or_default();

    let middle = user.middle_name.trim();
    TestResultSubmission {
        user_id: user.user_id.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        middle_name: (!middle.is_empty()).then(|| user.middle_name.clone()),
        test_id: test.id,
        answers: wire_answers,
        score: None,
        date: None,
    }
}
