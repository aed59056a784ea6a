use std::path::PathBuf;
use thiserror::Error;

use crate::survey::question::QuestionId;

/// Errors raised by the survey core.
///
/// Bad user input is not an error: it comes back as a
/// [`Rejection`](crate::survey::question::Rejection) and the user is asked again.
#[derive(Error, Debug)]
pub enum SurveyError {
    /// The driver pointed at a question id the set does not contain
    #[error("Unknown question id {0}")]
    UnknownQuestion(QuestionId),

    /// A Multiple question is active but the session holds no selection progress
    #[error("No selection progress for multiple choice question {0}")]
    MissingProgress(QuestionId),

    /// A prompt must be edited but its message id was never recorded
    #[error("No prompt message recorded for question {0}")]
    MissingMessage(QuestionId),

    /// A configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON for the expected shape
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The question definitions are structurally wrong
    #[error("Invalid question set: {0}")]
    InvalidQuestionSet(String),
}

impl SurveyError {
    /// Create an invalid question set error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidQuestionSet(message.into())
    }
}
