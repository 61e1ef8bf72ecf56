//! Interactive wizard: the terminal presentation layer over the controller.
//!
//! Every prompt accepts `:q` (quit, progress stays saved) and `:reset`
//! (start over after confirmation).

use std::io::{BufRead, Write};
use std::time::Duration;

use testflow_core::error::Result;
use testflow_core::{
    PercentageAnimation, StatePersistence, Step, TestOutcome, TestService, UiCue, UserDataUpdate,
    WizardController, WizardError,
};

use super::{CliResult, Context};
use crate::prompt::{Input, Terminal};

/// Presentation timings taken from config.
pub struct Timings {
    pub reset_delay: Duration,
    pub animation_frame: Duration,
}

enum Flow {
    Continue,
    Quit,
    Reset,
    Done,
}

pub async fn run(ctx: &Context) -> CliResult {
    let mut wizard = ctx.wizard()?;
    let mut term = Terminal::stdio();
    let timings = Timings {
        reset_delay: ctx.config.reset_delay(),
        animation_frame: ctx.config.animation_frame(),
    };
    drive(&mut wizard, &mut term, &timings).await
}

pub async fn drive<S, P, R, W>(
    wizard: &mut WizardController<S, P>,
    term: &mut Terminal<R, W>,
    timings: &Timings,
) -> CliResult
where
    S: TestService,
    P: StatePersistence,
    R: BufRead,
    W: Write,
{
    if !load(wizard, term).await? {
        return Ok(());
    }

    loop {
        render_stepper(wizard, term)?;
        if let Some(err) = wizard.error() {
            term.say(&format!("! {err}"))?;
        }

        let flow = match wizard.current_step() {
            Step::Identity => identity_step(wizard, term)?,
            Step::Test(_) => test_step(wizard, term).await?,
            Step::Results => results_step(wizard, term, timings).await?,
            Step::OutOfRange => Flow::Reset,
        };

        match flow {
            Flow::Continue => {}
            Flow::Quit => {
                term.say("Progress saved. Run `testflow run` to continue.")?;
                return Ok(());
            }
            Flow::Done => return Ok(()),
            Flow::Reset => {
                if wizard.active_step() == 0 {
                    term.say("Nothing to reset yet.")?;
                } else if term.confirm(
                    "Finish testing? All unsaved results will be lost.",
                    false,
                )? {
                    tokio::time::sleep(timings.reset_delay).await;
                    wizard.reset();
                    if !load(wizard, term).await? {
                        return Ok(());
                    }
                }
            }
        }

        for cue in wizard.take_cues() {
            match cue {
                UiCue::ScrollToTop { delay } => {
                    tokio::time::sleep(delay).await;
                    term.clear_screen()?;
                }
            }
        }
    }
}

/// Fetch the catalog, offering retries. Returns false if the user gives up.
async fn load<S, P, R, W>(
    wizard: &mut WizardController<S, P>,
    term: &mut Terminal<R, W>,
) -> Result<bool>
where
    S: TestService,
    P: StatePersistence,
    R: BufRead,
    W: Write,
{
    term.say("Loading tests...")?;
    while wizard.initialize().await.is_err() {
        term.say(&format!("! {}", wizard.error().unwrap_or("Failed to load tests")))?;
        if !term.confirm("Retry?", true)? {
            return Ok(false);
        }
    }
    if wizard.was_restored() {
        term.say("Resuming saved progress.")?;
    }
    Ok(true)
}

fn render_stepper<S, P, R, W>(
    wizard: &WizardController<S, P>,
    term: &mut Terminal<R, W>,
) -> std::io::Result<()>
where
    S: TestService,
    P: StatePersistence,
    R: BufRead,
    W: Write,
{
    let active = wizard.active_step();
    let line = wizard
        .step_labels()
        .iter()
        .enumerate()
        .map(|(i, label)| {
            if i == active {
                format!("[{label}]")
            } else if i < active {
                format!("✓ {label}")
            } else {
                label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ");
    term.say("")?;
    term.say(&line)
}

fn identity_step<S, P, R, W>(
    wizard: &mut WizardController<S, P>,
    term: &mut Terminal<R, W>,
) -> Result<Flow>
where
    S: TestService,
    P: StatePersistence,
    R: BufRead,
    W: Write,
{
    let user = wizard.user_data().clone();
    let fields: [(&str, String, fn(String) -> UserDataUpdate); 3] = [
        ("First name", user.first_name, UserDataUpdate::FirstName),
        ("Last name", user.last_name, UserDataUpdate::LastName),
        ("Middle name (optional)", user.middle_name, UserDataUpdate::MiddleName),
    ];
    for (label, current, update) in fields {
        match term.ask(label, Some(&current))? {
            Input::Text(value) => wizard.set_user_data(update(value)),
            Input::Quit => return Ok(Flow::Quit),
            Input::Reset => return Ok(Flow::Reset),
        }
    }

    match wizard.advance_from_identity() {
        Ok(_) => Ok(Flow::Continue),
        Err(WizardError::IdentityIncomplete) => {
            term.say("First and last name are required.")?;
            Ok(Flow::Continue)
        }
        Err(e) => Err(e.into()),
    }
}

async fn test_step<S, P, R, W>(
    wizard: &mut WizardController<S, P>,
    term: &mut Terminal<R, W>,
) -> Result<Flow>
where
    S: TestService,
    P: StatePersistence,
    R: BufRead,
    W: Write,
{
    let Some(test) = wizard.current_test().cloned() else {
        return Ok(Flow::Continue);
    };
    term.say(&format!("== {} ==", test.title))?;

    for (n, question) in test.questions.iter().enumerate() {
        let selected = wizard.answers().get(test.id, question.id);
        term.say(&format!("{}. {}", n + 1, question.question))?;
        for (i, option) in question.options.iter().enumerate() {
            let marker = if selected == Some(i) { "*" } else { " " };
            term.say(&format!("  {marker} {}) {option}", i + 1))?;
        }
        if question.options.is_empty() {
            continue;
        }
        match term.ask_choice("Answer", question.options.len(), selected.map(|s| s + 1))? {
            Input::Text(choice) => {
                if let Ok(choice) = choice.parse::<usize>() {
                    wizard.record_answer(test.id, question.id, choice - 1);
                }
            }
            Input::Quit => return Ok(Flow::Quit),
            Input::Reset => return Ok(Flow::Reset),
        }
    }

    if !wizard.is_current_test_complete() {
        term.say("Some questions are still unanswered.")?;
        return Ok(Flow::Continue);
    }
    if !term.confirm("Finish this test?", true)? {
        return Ok(Flow::Continue);
    }
    match wizard.submit_current_test().await {
        Ok(_) | Err(WizardError::Submission) => Ok(Flow::Continue),
        Err(e) => Err(e.into()),
    }
}

async fn results_step<S, P, R, W>(
    wizard: &mut WizardController<S, P>,
    term: &mut Terminal<R, W>,
    timings: &Timings,
) -> Result<Flow>
where
    S: TestService,
    P: StatePersistence,
    R: BufRead,
    W: Write,
{
    if wizard.results().is_none() {
        term.say("Loading results...")?;
        if let Err(e) = wizard.load_results().await {
            term.say(&format!("! {e}"))?;
            let retry = term.confirm("Retry?", true)?;
            return Ok(if retry { Flow::Continue } else { Flow::Quit });
        }
    }

    let outcomes = wizard.results().map(<[_]>::to_vec).unwrap_or_default();
    term.say("Your results")?;
    for outcome in &outcomes {
        animate(term, outcome, timings.animation_frame).await?;
    }

    if term.confirm("Finish and clear your progress?", true)? {
        tokio::time::sleep(timings.reset_delay).await;
        wizard.reset();
        term.say("Thank you!")?;
        Ok(Flow::Done)
    } else {
        Ok(Flow::Quit)
    }
}

async fn animate<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    outcome: &TestOutcome,
    frame: Duration,
) -> std::io::Result<()> {
    term.say(&outcome.title)?;
    let animation = PercentageAnimation::new(outcome.percentage);
    for value in animation.frames() {
        write!(term.out(), "\r  {:>3}%", value.floor())?;
        term.out().flush()?;
        if !frame.is_zero() {
            tokio::time::sleep(frame).await;
        }
    }
    writeln!(term.out())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use testflow_core::{
        ApiError, MemoryStateStore, Question, Test, TestId, TestResultSubmission, TestScore,
    };

    #[derive(Default)]
    struct ScriptedService {
        submitted: Mutex<Vec<TestResultSubmission>>,
    }

    impl TestService for ScriptedService {
        async fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
            Ok(vec![Test {
                id: 1,
                title: "Arithmetic".into(),
                questions: vec![Question {
                    id: 1,
                    question: "2+2?".into(),
                    options: vec!["3".into(), "4".into(), "5".into()],
                    correct_answer: None,
                }],
            }])
        }

        async fn get_test(&self, test_id: TestId) -> Result<Test, ApiError> {
            Err(ApiError::NotFound(test_id.to_string()))
        }

        async fn submit_result(&self, submission: &TestResultSubmission) -> Result<(), ApiError> {
            self.submitted.lock().unwrap().push(submission.clone());
            Ok(())
        }

        async fn fetch_score(&self, _user_id: &str, _test_id: TestId) -> Result<TestScore, ApiError> {
            Ok(TestScore {
                percentage: 100.0,
                score: Some(1),
                test_id: None,
                user_id: None,
                date: None,
            })
        }

        async fn download_pdf(&self, _user_id: &str, _test_id: TestId) -> Result<Vec<u8>, ApiError> {
            Ok(Vec::new())
        }
    }

    const NO_WAIT: Timings = Timings {
        reset_delay: Duration::ZERO,
        animation_frame: Duration::ZERO,
    };

    #[tokio::test]
    async fn walks_through_whole_wizard() {
        let store = MemoryStateStore::new();
        let mut wizard = WizardController::new(ScriptedService::default(), &store)
            .with_scroll_delay(Duration::ZERO);
        // names, one answer, confirm submit, confirm finish
        let mut term = Terminal::new("Anna\nPetrova\n\n2\n\n\n".as_bytes(), Vec::new());

        drive(&mut wizard, &mut term, &NO_WAIT).await.unwrap();

        let sent = wizard.service().submitted.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].answers.get(&1), Some(&2));
        assert_eq!(sent[0].last_name, "Petrova");
        // Finishing resets the wizard and clears saved progress.
        assert_eq!(wizard.active_step(), 0);
        assert!(store.snapshot().is_none());

        let printed = String::from_utf8(term.out().clone()).unwrap();
        assert!(printed.contains("[Personal data] > Arithmetic > Finish"));
        assert!(printed.contains("Your results"));
        assert!(printed.contains("100%"));
        assert!(printed.contains("Thank you!"));
    }

    #[tokio::test]
    async fn animation_shows_floored_percentage() {
        let mut term = Terminal::new("".as_bytes(), Vec::new());
        let outcome = TestOutcome {
            test_id: 1,
            title: "Arithmetic".into(),
            percentage: 66.6,
        };
        animate(&mut term, &outcome, Duration::ZERO).await.unwrap();

        let printed = String::from_utf8(term.out().clone()).unwrap();
        assert!(printed.trim_end().ends_with("66%"));
        assert!(!printed.contains("67%"));
    }

    #[tokio::test]
    async fn quitting_keeps_progress() {
        let store = MemoryStateStore::new();
        let mut wizard = WizardController::new(ScriptedService::default(), &store);
        let mut term = Terminal::new("Anna\nPetrova\n\n:q\n".as_bytes(), Vec::new());

        drive(&mut wizard, &mut term, &NO_WAIT).await.unwrap();

        assert_eq!(wizard.active_step(), 1);
        let saved = testflow_core::WizardState::from_json(&store.snapshot().unwrap()).unwrap();
        assert_eq!(saved.active_step, 1);
        assert_eq!(saved.user_data.first_name, "Anna");
    }

    #[tokio::test]
    async fn missing_last_name_stays_on_identity() {
        let store = MemoryStateStore::new();
        let mut wizard = WizardController::new(ScriptedService::default(), &store);
        let mut term = Terminal::new("Anna\n\n\n".as_bytes(), Vec::new());

        drive(&mut wizard, &mut term, &NO_WAIT).await.unwrap();

        assert_eq!(wizard.active_step(), 0);
        let printed = String::from_utf8(term.out().clone()).unwrap();
        assert!(printed.contains("First and last name are required."));
    }
}
