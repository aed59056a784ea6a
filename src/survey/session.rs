use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::survey::question::{
    multiple_rows, AnswerValue, Question, QuestionId, QuestionKind, DONE_CHOICE,
};
use crate::survey::question_set::QuestionSet;

/// Per-chat state of one survey attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub question_id: QuestionId,
    pub answers: BTreeMap<QuestionId, AnswerValue>,
    /// Telegram message id of each prompt, so it can be edited later
    pub messages: HashMap<QuestionId, i32>,
    /// Selection progress of the active multiple choice question
    pub multiple: Option<MultipleProgress>,
}

impl Session {
    /// Start a session positioned on `first`
    pub fn start(first: &Question) -> Self {
        Self {
            id: Uuid::new_v4(),
            question_id: first.id,
            answers: BTreeMap::new(),
            messages: HashMap::new(),
            multiple: MultipleProgress::for_question(first),
        }
    }

    /// Move to `question`, giving it fresh selection progress if it is a
    /// multiple choice question
    pub fn move_to(&mut self, question: &Question) {
        self.question_id = question.id;
        self.multiple = MultipleProgress::for_question(question);
    }

    /// Remember the message carrying the prompt of `question_id`
    pub fn remember_message(&mut self, question_id: QuestionId, message_id: i32) {
        self.messages.insert(question_id, message_id);
    }

    /// Message id of the prompt of `question_id`
    pub fn message_for(&self, question_id: QuestionId) -> Option<i32> {
        self.messages.get(&question_id).copied()
    }

    /// Whether the active prompt is the given message
    pub fn is_current_prompt(&self, message_id: i32) -> bool {
        self.message_for(self.question_id) == Some(message_id)
    }
}

/// Options still available and options picked so far on a multiple choice
/// question. Each session owns its copy of the rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleProgress {
    pub question_id: QuestionId,
    pub remaining: Vec<Vec<String>>,
    pub selected: Vec<String>,
}

impl MultipleProgress {
    fn for_question(question: &Question) -> Option<Self> {
        match &question.kind {
            QuestionKind::Multiple { choices, .. } => Some(Self {
                question_id: question.id,
                remaining: multiple_rows(choices),
                selected: Vec::new(),
            }),
            _ => None,
        }
    }

    /// Record a pick, dropping it from the remaining rows when it was one of
    /// them. Rows left empty are removed.
    ///
    /// Returns whether the remaining rows changed.
    pub fn pick(&mut self, choice: &str) -> bool {
        let before = self.remaining.clone();
        for row in &mut self.remaining {
            row.retain(|c| c != choice);
        }
        self.remaining.retain(|row| !row.is_empty());
        self.selected.push(choice.to_string());
        self.remaining != before
    }

    /// Whether anything besides the `Done` choice is left to pick
    pub fn has_options_left(&self) -> bool {
        self.remaining
            .iter()
            .flatten()
            .any(|c| c != DONE_CHOICE)
    }

    /// The final answer: picks joined in order
    pub fn joined(&self) -> String {
        self.selected.join(", ")
    }
}

/// One answer slot of a completed survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedAnswer {
    pub question_id: QuestionId,
    pub form_entry: Option<String>,
    /// `None` when the question was skipped
    pub value: Option<AnswerValue>,
}

/// Everything a sink needs to store one completed survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub session_id: Uuid,
    pub chat_id: i64,
    pub completed_at: DateTime<Utc>,
    /// One slot per question, ascending by id
    pub answers: Vec<RecordedAnswer>,
}

impl AnswerRecord {
    /// Collect the answers of `session` in question order
    pub fn from_session(questions: &QuestionSet, session: &Session, chat_id: i64) -> Self {
        let answers = questions
            .iter()
            .map(|q| RecordedAnswer {
                question_id: q.id,
                form_entry: q.form_entry.clone(),
                value: session.answers.get(&q.id).cloned(),
            })
            .collect();
        Self {
            session_id: session.id,
            chat_id,
            completed_at: Utc::now(),
            answers,
        }
    }

    /// Answers as cell values, skipped questions as empty strings
    pub fn values(&self) -> Vec<String> {
        self.answers
            .iter()
            .map(|a| a.value.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect()
    }

    /// Completion time in the spreadsheet timestamp format
    pub fn timestamp(&self) -> String {
        self.completed_at.format("%Y/%m/%d %H:%M:%S").to_string()
    }
}
