use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::survey::error::SurveyError;
use crate::survey::question::{Question, QuestionId, QuestionKind};

/// Telegram rejects inline buttons whose callback data is longer than this
const MAX_CALLBACK_BYTES: usize = 64;

/// The ordered, immutable set of survey questions
#[derive(Debug, Clone)]
pub struct QuestionSet {
    questions: BTreeMap<QuestionId, Question>,
}

impl QuestionSet {
    /// Load and validate the question file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SurveyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SurveyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let questions: Vec<Question> =
            serde_json::from_str(&raw).map_err(|source| SurveyError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(questions)
    }

    /// Build a set from parsed questions, checking the structural rules:
    /// ids are dense from 1, only the highest id may be flagged `last`, and
    /// every kind has usable bounds and choices.
    pub fn new(questions: Vec<Question>) -> Result<Self, SurveyError> {
        if questions.is_empty() {
            return Err(SurveyError::invalid("at least one question is required"));
        }

        let mut by_id = BTreeMap::new();
        for question in questions {
            check_kind(&question)?;
            let id = question.id;
            if by_id.insert(id, question).is_some() {
                return Err(SurveyError::invalid(format!("duplicate question id {id}")));
            }
        }

        for (expected, id) in (1..).zip(by_id.keys()) {
            if *id != expected {
                return Err(SurveyError::invalid(format!(
                    "question ids must be dense from 1, expected {expected} but found {id}"
                )));
            }
        }

        let final_id = by_id.len() as QuestionId;
        if let Some(q) = by_id.values().find(|q| q.last && q.id != final_id) {
            return Err(SurveyError::invalid(format!(
                "question {} is flagged last but question {final_id} follows it",
                q.id
            )));
        }

        Ok(Self { questions: by_id })
    }

    /// Look up a question by id
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(&id)
    }

    /// Like [`get`](Self::get) but a missing id is a driver error
    pub fn require(&self, id: QuestionId) -> Result<&Question, SurveyError> {
        self.get(id).ok_or(SurveyError::UnknownQuestion(id))
    }

    /// Id of the first question
    pub fn first_id(&self) -> QuestionId {
        1
    }

    /// Whether `id` is the final question
    pub fn is_final(&self, id: QuestionId) -> bool {
        id as usize == self.questions.len()
    }

    /// Number of questions
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a loaded set
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }
}

fn check_kind(question: &Question) -> Result<(), SurveyError> {
    let id = question.id;
    match &question.kind {
        QuestionKind::Number {
            min: Some(min),
            max: Some(max),
        } if min > max => Err(SurveyError::invalid(format!(
            "question {id}: min {min} is greater than max {max}"
        ))),
        QuestionKind::Range {
            range: (min, max), ..
        } if min > max => Err(SurveyError::invalid(format!(
            "question {id}: range [{min}, {max}] is empty"
        ))),
        QuestionKind::InlineChoice { choices }
        | QuestionKind::ButtonChoice { choices }
        | QuestionKind::Multiple { choices, .. }
            if choices.iter().flatten().next().is_none() =>
        {
            Err(SurveyError::invalid(format!("question {id}: no choices declared")))
        }
        QuestionKind::Multiple {
            limit: Some(0), ..
        } => Err(SurveyError::invalid(format!(
            "question {id}: limit must be at least 1"
        ))),
        QuestionKind::InlineChoice { choices } | QuestionKind::Multiple { choices, .. } => {
            match choices.iter().flatten().find(|c| c.len() > MAX_CALLBACK_BYTES) {
                Some(choice) => Err(SurveyError::invalid(format!(
                    "question {id}: choice '{choice}' is longer than {MAX_CALLBACK_BYTES} bytes"
                ))),
                None => Ok(()),
            }
        }
        _ => Ok(()),
    }
}
