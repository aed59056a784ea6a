pub mod error;
pub mod machine;
pub mod question;
pub mod question_set;
pub mod session;

pub use error::SurveyError;
pub use machine::{after_submit, transition, Effect, Event, Step, SurveyState};
pub use question::{AnswerValue, Input, Keyboard, Question, QuestionId, QuestionKind, Rejection};
pub use question_set::QuestionSet;
pub use session::{AnswerRecord, MultipleProgress, RecordedAnswer, Session};
