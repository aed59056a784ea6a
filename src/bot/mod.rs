/// Bot commands
pub mod commands;
/// Shared state handed to every handler
pub mod context;
/// Executes the effects of survey transitions against Telegram
pub mod driver;
/// Update handlers and the dispatcher schema
pub mod handlers;
/// Conversion of keyboard layouts into Telegram markup
pub mod render;

use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::survey::SurveyState;

pub use context::SurveyContext;

/// Callback data of the welcome message's accept button
pub const ACCEPT_CALLBACK: &str = "survey:accept";

/// Per-chat survey dialogue
pub type SurveyDialogue = Dialogue<SurveyState, InMemStorage<SurveyState>>;
/// Dialogue storage shared with the dispatcher
pub type SurveyStorage = InMemStorage<SurveyState>;
/// Result type of every endpoint
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
