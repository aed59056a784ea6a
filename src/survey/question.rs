//! Question definitions, per-kind validation and prompt rendering.
//!
//! Questions are loaded once from JSON and never mutated afterwards. Anything
//! that changes while a user answers (for example the options still available
//! on a multiple choice question) lives in the session, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::markdown::escape_markdown;

/// Position of a question in the survey, starting at 1
pub type QuestionId = u32;

/// Choice that closes a multiple choice question
pub const DONE_CHOICE: &str = "Done";

/// Largest `max - min` span that still gets a number keypad
const KEYPAD_MAX_SPAN: i64 = 10;
const KEYPAD_ROW_WIDTH: usize = 3;

/// A single survey question as declared in the question file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub last: bool,
    /// Google Forms field (`entry.NNN`) this answer is posted under
    #[serde(default)]
    pub form_entry: Option<String>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_required() -> bool {
    true
}

/// Question kinds, each carrying only the fields it needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Number {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    InlineChoice {
        choices: Vec<Vec<String>>,
    },
    ButtonChoice {
        choices: Vec<Vec<String>>,
    },
    Text,
    Range {
        range: (i64, i64),
        #[serde(default)]
        min_description: Option<String>,
        #[serde(default)]
        max_description: Option<String>,
    },
    Multiple {
        choices: Vec<Vec<String>>,
        #[serde(default)]
        limit: Option<usize>,
        #[serde(default)]
        allow_other: bool,
    },
}

impl QuestionKind {
    /// Short name used in logs and the checker output
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Number { .. } => "number",
            QuestionKind::InlineChoice { .. } => "inline_choice",
            QuestionKind::ButtonChoice { .. } => "button_choice",
            QuestionKind::Text => "text",
            QuestionKind::Range { .. } => "range",
            QuestionKind::Multiple { .. } => "multiple",
        }
    }
}

/// A validated answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{n}"),
            AnswerValue::Text(t) => f.write_str(t),
        }
    }
}

/// Raw answer together with how it reached the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Typed as a chat message
    Typed(String),
    /// Pressed on an inline keyboard
    Button(String),
}

impl Input {
    /// The raw text of the answer
    pub fn value(&self) -> &str {
        match self {
            Input::Typed(v) | Input::Button(v) => v,
        }
    }
}

/// Why an answer was not accepted, worded for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection(String);

impl Rejection {
    /// Create a rejection with a user facing reason
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self(reason.into())
    }

    /// The user facing reason
    pub fn reason(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyboard layout attached to a prompt, as plain labels.
///
/// Inline buttons use the label as callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    Inline(Vec<Vec<String>>),
    /// One-time reply keyboard, pressing a button sends its label as text
    Reply(Vec<Vec<String>>),
}

impl Question {
    /// Whether this is a multiple choice question
    pub fn is_multiple(&self) -> bool {
        matches!(self.kind, QuestionKind::Multiple { .. })
    }

    /// Validate a raw answer against the rules of this question's kind.
    pub fn validate(&self, raw: &str) -> Result<AnswerValue, Rejection> {
        match &self.kind {
            QuestionKind::Number { min, max } => {
                let value = parse_integer(raw)?;
                if let Some(min) = min {
                    if value < *min {
                        return Err(Rejection::new(format!(
                            "The number must be greater than or equal to {min}."
                        )));
                    }
                }
                if let Some(max) = max {
                    if value > *max {
                        return Err(Rejection::new(format!(
                            "The number must be less than or equal to {max}."
                        )));
                    }
                }
                Ok(AnswerValue::Number(value))
            }
            QuestionKind::Range { range: (min, max), .. } => {
                let value = parse_integer(raw)?;
                if value < *min || value > *max {
                    return Err(Rejection::new(format!(
                        "{value} is not in range [{min}, {max}]."
                    )));
                }
                Ok(AnswerValue::Number(value))
            }
            QuestionKind::InlineChoice { choices } | QuestionKind::ButtonChoice { choices } => {
                if contains_choice(choices, raw) {
                    Ok(AnswerValue::Text(raw.to_string()))
                } else {
                    Err(Rejection::new("Invalid option."))
                }
            }
            QuestionKind::Text => Ok(AnswerValue::Text(raw.to_string())),
            QuestionKind::Multiple {
                choices,
                allow_other,
                ..
            } => {
                if raw == DONE_CHOICE || contains_choice(choices, raw) {
                    return Ok(AnswerValue::Text(raw.to_string()));
                }
                let other = raw.trim();
                if *allow_other && !other.is_empty() {
                    Ok(AnswerValue::Text(other.to_string()))
                } else {
                    Err(Rejection::new("Invalid option."))
                }
            }
        }
    }

    /// Check the input source is one this kind takes, then validate it.
    pub fn answer(&self, input: &Input) -> Result<AnswerValue, Rejection> {
        let accepted = match input {
            Input::Typed(_) => self.accepts_typed(),
            Input::Button(_) => self.accepts_button(),
        };
        if !accepted {
            return Err(match input {
                Input::Typed(_) => Rejection::new("Please use the buttons above."),
                Input::Button(_) => Rejection::new("Please type your answer."),
            });
        }
        self.validate(input.value())
    }

    fn accepts_typed(&self) -> bool {
        match &self.kind {
            QuestionKind::Number { .. }
            | QuestionKind::Text
            | QuestionKind::Range { .. }
            | QuestionKind::ButtonChoice { .. } => true,
            QuestionKind::InlineChoice { .. } => false,
            QuestionKind::Multiple { allow_other, .. } => *allow_other,
        }
    }

    fn accepts_button(&self) -> bool {
        match &self.kind {
            QuestionKind::Number { min, max } => number_keypad(*min, *max).is_some(),
            QuestionKind::InlineChoice { .. } | QuestionKind::Multiple { .. } => true,
            QuestionKind::Text | QuestionKind::Range { .. } | QuestionKind::ButtonChoice { .. } => {
                false
            }
        }
    }

    /// Keyboard for the prompt.
    ///
    /// `remaining` overrides the rows of a multiple choice question with the
    /// options the session has not picked yet.
    pub fn keyboard(&self, remaining: Option<&[Vec<String>]>) -> Option<Keyboard> {
        match &self.kind {
            QuestionKind::Number { min, max } => number_keypad(*min, *max).map(Keyboard::Inline),
            QuestionKind::InlineChoice { choices } => Some(Keyboard::Inline(choices.clone())),
            QuestionKind::ButtonChoice { choices } => Some(Keyboard::Reply(choices.clone())),
            QuestionKind::Multiple { choices, .. } => {
                let rows = match remaining {
                    Some(rows) => rows.to_vec(),
                    None => multiple_rows(choices),
                };
                Some(Keyboard::Inline(rows))
            }
            QuestionKind::Text | QuestionKind::Range { .. } => None,
        }
    }

    /// Full prompt in MarkdownV2
    pub fn prompt_text(&self) -> String {
        let mut text = format!("*{}*", escape_markdown(&format!("{}. {}", self.id, self.text)));
        if let Some(description) = &self.description {
            text.push_str(&format!("\n\n_• {}_", escape_markdown(description)));
        }
        text.push_str(&self.note());
        if !self.required {
            text.push_str("\n\n/skip this question");
        }
        text
    }

    /// Prompt rewritten after the question was answered
    pub fn answered_text(&self) -> String {
        format!("*{}*", escape_markdown(&format!("✅{}. {}", self.id, self.text)))
    }

    /// Prompt rewritten after the question was skipped
    pub fn skipped_text(&self) -> String {
        format!("*{}*", escape_markdown(&format!("🔰{}. {}", self.id, self.text)))
    }

    fn note(&self) -> String {
        match &self.kind {
            QuestionKind::Range {
                range: (min, max),
                min_description,
                max_description,
            } => {
                let min = escape_markdown(&min.to_string());
                let max = escape_markdown(&max.to_string());
                let mut note = format!("\n\n`       `*{min}* {} *{max}*", "▫️".repeat(5));
                if let Some(desc) = min_description {
                    note.push_str(&format!("\n\n`{min}` \\- `{}`", escape_markdown(desc)));
                }
                if let Some(desc) = max_description {
                    note.push_str(&format!("\n`{max}` \\- `{}`", escape_markdown(desc)));
                }
                note
            }
            QuestionKind::Multiple {
                limit, allow_other, ..
            } => {
                let mut note = String::new();
                if let Some(limit) = limit {
                    note.push_str(&format!("\n\n_maximum choice:_ `{limit}`"));
                }
                if *allow_other {
                    note.push_str("\n\n*Write if other option exists\\.*");
                }
                note
            }
            QuestionKind::Number { min, max } if number_keypad(*min, *max).is_none() => {
                let hint = match (min, max) {
                    (Some(min), Some(max)) => {
                        format!("_Enter a number between_ `{min}` _and_ `{max}`\\.")
                    }
                    (Some(min), None) => format!("_Enter a number of at least_ `{min}`\\."),
                    (None, Some(max)) => format!("_Enter a number of at most_ `{max}`\\."),
                    (None, None) => "_Enter a number\\._".to_string(),
                };
                format!("\n`{}`\n{hint}", "-".repeat(20))
            }
            _ => String::new(),
        }
    }
}

/// Template rows of a multiple choice question with the `Done` row appended
pub fn multiple_rows(choices: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut rows = choices.to_vec();
    rows.push(vec![DONE_CHOICE.to_string()]);
    rows
}

fn parse_integer(raw: &str) -> Result<i64, Rejection> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Rejection::new("Please enter a whole number."))
}

fn contains_choice(rows: &[Vec<String>], value: &str) -> bool {
    rows.iter().flatten().any(|choice| choice == value)
}

fn number_keypad(min: Option<i64>, max: Option<i64>) -> Option<Vec<Vec<String>>> {
    let (min, max) = (min?, max?);
    if max.checked_sub(min).map_or(true, |span| !(0..KEYPAD_MAX_SPAN).contains(&span)) {
        return None;
    }
    let numbers: Vec<String> = (min..=max).map(|n| n.to_string()).collect();
    Some(numbers.chunks(KEYPAD_ROW_WIDTH).map(<[String]>::to_vec).collect())
}
