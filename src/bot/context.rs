use std::sync::Arc;

use crate::config::Messages;
use crate::sinks::AnswerSink;
use crate::survey::QuestionSet;

/// Everything the handlers share, built once at startup
pub struct SurveyContext {
    pub questions: QuestionSet,
    pub messages: Messages,
    pub sink: Arc<dyn AnswerSink>,
}

impl SurveyContext {
    pub fn new(questions: QuestionSet, messages: Messages, sink: Arc<dyn AnswerSink>) -> Self {
        Self {
            questions,
            messages,
            sink,
        }
    }
}
