use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::TestId;

/// Every successful controller transition produces an Event.
/// Presentation layers may log or render them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Catalog arrived and the wizard became usable.
    Initialized {
        test_count: usize,
        /// Progress came from an earlier session.
        restored: bool,
        active_step: usize,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        from_step: usize,
        to_step: usize,
        at: DateTime<Utc>,
    },
    TestSubmitted {
        test_id: TestId,
        step: usize,
        next_step: usize,
        at: DateTime<Utc>,
    },
    ResultsLoaded {
        test_count: usize,
        at: DateTime<Utc>,
    },
    WizardReset {
        at: DateTime<Utc>,
    },
}

/// Visual affordances the controller asks for but does not wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCue {
    /// Bring the top of the next step into view after `delay`.
    ScrollToTop { delay: Duration },
}
