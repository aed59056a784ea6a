//! Per-chat survey state machine.
//!
//! [`transition`] is a pure function from the current state and an event to
//! the next state plus the effects the bot has to carry out. It never talks to
//! Telegram or a sink, so every path is testable on its own.

use crate::survey::error::SurveyError;
use crate::survey::question::{
    AnswerValue, Input, Question, QuestionId, QuestionKind, Rejection, DONE_CHOICE,
};
use crate::survey::question_set::QuestionSet;
use crate::survey::session::Session;

/// Conversation state stored per chat
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SurveyState {
    /// No survey running
    #[default]
    Idle,
    /// Welcome shown, waiting for the user to accept
    Welcome,
    /// Answering the question at `session.question_id`
    Answering(Session),
    /// Every question handled, waiting for the sink write to succeed
    Submitting(Session),
}

impl SurveyState {
    /// The running session, if any
    pub fn session(&self) -> Option<&Session> {
        match self {
            SurveyState::Answering(s) | SurveyState::Submitting(s) => Some(s),
            SurveyState::Idle | SurveyState::Welcome => None,
        }
    }

    /// Mutable access to the running session, if any
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            SurveyState::Answering(s) | SurveyState::Submitting(s) => Some(s),
            SurveyState::Idle | SurveyState::Welcome => None,
        }
    }
}

/// Something the user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    Accept,
    Answer(Input),
    Skip,
    Cancel,
    Retry,
}

/// Something the bot has to do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the welcome message with the accept button
    Welcome,
    /// Replace the welcome message with the accepted text
    Accepted,
    /// Send the prompt of a question and remember its message id
    Prompt(QuestionId),
    /// Redraw the keyboard of a multiple choice prompt
    Refresh(QuestionId),
    /// Confirm a typed selection that leaves the keyboard as it was
    Noted(QuestionId, String),
    /// Mark a prompt as answered
    Answered(QuestionId),
    /// Mark a prompt as skipped
    Skipped(QuestionId),
    /// Tell the user why the input was not taken
    Rejected(String),
    /// Write the collected answers to the sink
    Submit,
    Cancelled,
    AlreadyRunning,
    NotRunning,
}

/// Result of a transition
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: SurveyState,
    pub effects: Vec<Effect>,
}

impl Step {
    fn new(state: SurveyState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    fn stay(state: SurveyState, effect: Effect) -> Self {
        Self::new(state, vec![effect])
    }

    fn reject(state: SurveyState, rejection: Rejection) -> Self {
        Self::stay(state, Effect::Rejected(rejection.reason().to_string()))
    }
}

/// Apply `event` to `state`.
///
/// Errors are lookup failures that mean the session no longer matches the
/// question set; the caller should drop the session.
pub fn transition(
    questions: &QuestionSet,
    state: SurveyState,
    event: Event,
) -> Result<Step, SurveyError> {
    use Event::*;
    use SurveyState::*;

    match (state, event) {
        (Idle | Welcome, Start) => Ok(Step::stay(Welcome, Effect::Welcome)),
        (state @ (Answering(_) | Submitting(_)), Start) => {
            Ok(Step::stay(state, Effect::AlreadyRunning))
        }

        (Welcome, Accept) => {
            let first = questions.require(questions.first_id())?;
            let session = Session::start(first);
            Ok(Step::new(
                Answering(session),
                vec![Effect::Accepted, Effect::Prompt(first.id)],
            ))
        }
        (Welcome, Answer(_)) => Ok(Step::reject(
            Welcome,
            Rejection::new("Please press the button above to continue."),
        )),
        (Welcome, Skip | Retry) => Ok(Step::new(Welcome, Vec::new())),

        (Answering(session), Answer(input)) => answer(questions, session, &input),
        (Answering(session), Skip) => skip(questions, session),
        (state @ Answering(_), Accept | Retry) => Ok(Step::new(state, Vec::new())),

        (Submitting(session), Retry) => Ok(Step::stay(Submitting(session), Effect::Submit)),
        (Submitting(session), Answer(_) | Skip) => Ok(Step::reject(
            Submitting(session),
            Rejection::new("Your answers are waiting to be saved. Press Retry or /cancel."),
        )),
        (state @ Submitting(_), Accept) => Ok(Step::new(state, Vec::new())),

        (Welcome | Answering(_) | Submitting(_), Cancel) => {
            Ok(Step::stay(Idle, Effect::Cancelled))
        }
        (Idle, Cancel | Accept | Answer(_) | Skip | Retry) => {
            Ok(Step::stay(Idle, Effect::NotRunning))
        }
    }
}

/// State after the sink handled a [`Effect::Submit`].
///
/// A successful write ends the survey. A failed one keeps the session in
/// `Submitting` so the user can retry or cancel.
pub fn after_submit<E>(state: SurveyState, outcome: &Result<(), E>) -> SurveyState {
    match (state, outcome) {
        (SurveyState::Submitting(_), Ok(())) => SurveyState::Idle,
        (state, _) => state,
    }
}

fn answer(questions: &QuestionSet, session: Session, input: &Input) -> Result<Step, SurveyError> {
    let question = questions.require(session.question_id)?;
    match question.answer(input) {
        Err(rejection) => Ok(Step::reject(SurveyState::Answering(session), rejection)),
        Ok(value) if question.is_multiple() => select(questions, session, question, value),
        Ok(value) => record(questions, session, question, value),
    }
}

fn select(
    questions: &QuestionSet,
    mut session: Session,
    question: &Question,
    value: AnswerValue,
) -> Result<Step, SurveyError> {
    let limit = match &question.kind {
        QuestionKind::Multiple { limit, .. } => *limit,
        _ => None,
    };
    let choice = value.to_string();
    let progress = session
        .multiple
        .as_mut()
        .filter(|p| p.question_id == question.id)
        .ok_or(SurveyError::MissingProgress(question.id))?;

    if choice == DONE_CHOICE {
        if question.required && progress.selected.is_empty() {
            return Ok(Step::reject(
                SurveyState::Answering(session),
                Rejection::new("This field is required."),
            ));
        }
    } else {
        if progress.selected.contains(&choice) {
            return Ok(Step::reject(
                SurveyState::Answering(session),
                Rejection::new(format!("{choice} is already selected.")),
            ));
        }
        let keyboard_changed = progress.pick(&choice);
        let limit_reached = limit.is_some_and(|l| progress.selected.len() >= l);
        if !limit_reached && progress.has_options_left() {
            let effect = if keyboard_changed {
                Effect::Refresh(question.id)
            } else {
                Effect::Noted(question.id, choice)
            };
            return Ok(Step::stay(SurveyState::Answering(session), effect));
        }
    }

    let joined = progress.joined();
    if joined.is_empty() {
        return skip(questions, session);
    }
    record(questions, session, question, AnswerValue::Text(joined))
}

fn record(
    questions: &QuestionSet,
    mut session: Session,
    question: &Question,
    value: AnswerValue,
) -> Result<Step, SurveyError> {
    session.answers.insert(question.id, value);
    advance(questions, session, Effect::Answered(question.id))
}

fn skip(questions: &QuestionSet, session: Session) -> Result<Step, SurveyError> {
    let question = questions.require(session.question_id)?;
    if question.required {
        return Ok(Step::reject(
            SurveyState::Answering(session),
            Rejection::new("This question is required."),
        ));
    }
    advance(questions, session, Effect::Skipped(question.id))
}

fn advance(
    questions: &QuestionSet,
    mut session: Session,
    closing: Effect,
) -> Result<Step, SurveyError> {
    if questions.is_final(session.question_id) {
        return Ok(Step::new(
            SurveyState::Submitting(session),
            vec![closing, Effect::Submit],
        ));
    }
    let next = questions.require(session.question_id + 1)?;
    session.move_to(next);
    Ok(Step::new(
        SurveyState::Answering(session),
        vec![closing, Effect::Prompt(next.id)],
    ))
}
