#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use survey_bot::sinks::{AnswerSink, SinkError};
use survey_bot::survey::{
    transition, AnswerRecord, Event, Input, Question, QuestionSet, Step, SurveyState,
};

/// Five questions covering every interaction style
pub const SAMPLE_QUESTIONS: &str = r#"[
    {"id": 1, "type": "number", "text": "How satisfied are you?", "min": 1, "max": 5, "form_entry": "entry.101"},
    {"id": 2, "type": "inline_choice", "text": "Favourite colour?", "choices": [["Red", "Blue"]], "form_entry": "entry.102"},
    {"id": 3, "type": "text", "text": "Anything else?", "required": false},
    {"id": 4, "type": "multiple", "text": "Pick your tools", "choices": [["A", "B"], ["C"]], "limit": 2, "allow_other": true, "form_entry": "entry.104"},
    {"id": 5, "type": "range", "text": "Rate us", "range": [1, 10], "required": false, "last": true}
]"#;

pub fn sample_questions() -> QuestionSet {
    questions_from_json(SAMPLE_QUESTIONS)
}

pub fn questions_from_json(json: &str) -> QuestionSet {
    let questions: Vec<Question> = serde_json::from_str(json).expect("Failed to parse questions");
    QuestionSet::new(questions).expect("Failed to build question set")
}

/// Apply one event, failing the test on a driver error
pub fn step(questions: &QuestionSet, state: SurveyState, event: Event) -> Step {
    transition(questions, state, event).expect("Transition failed")
}

pub fn typed(text: &str) -> Event {
    Event::Answer(Input::Typed(text.to_string()))
}

pub fn button(label: &str) -> Event {
    Event::Answer(Input::Button(label.to_string()))
}

/// State right after the user accepted the welcome message
pub fn accepted(questions: &QuestionSet) -> SurveyState {
    let welcome = step(questions, SurveyState::Idle, Event::Start).state;
    step(questions, welcome, Event::Accept).state
}

/// Sink that keeps every record in memory
#[derive(Default)]
pub struct RecordingSink {
    pub records: Mutex<Vec<AnswerRecord>>,
}

#[async_trait]
impl AnswerSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn submit(&self, record: &AnswerRecord) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Sink whose every write fails with an API error
#[derive(Default)]
pub struct FailingSink {
    pub attempts: Mutex<usize>,
}

#[async_trait]
impl AnswerSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn submit(&self, _record: &AnswerRecord) -> Result<(), SinkError> {
        *self.attempts.lock().unwrap() += 1;
        Err(SinkError::api_error(503, "Service Unavailable".to_string()))
    }
}
