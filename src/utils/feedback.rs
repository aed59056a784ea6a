//! Short status messages sent to the user outside of question prompts.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};

use crate::utils::markdown::escape_markdown;

/// Callback data of the button that retries a failed submission
pub const RETRY_CALLBACK: &str = "survey:retry";

/// Tone of a status message, shown as a leading emoji
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackType {
    Warning,
    Error,
    Info,
}

impl FeedbackType {
    fn emoji(self) -> &'static str {
        match self {
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
        }
    }
}

/// Status line in MarkdownV2, `message` is escaped
pub fn format_feedback(kind: FeedbackType, message: &str) -> String {
    format!("{} {}", kind.emoji(), escape_markdown(message))
}

/// Bold "try again" line shown when an answer is rejected
pub fn format_rejection(reason: &str) -> String {
    format!("*{}*", escape_markdown(&format!("{reason} Please try again!")))
}

/// Sends status messages to one chat
pub struct ChatFeedback {
    bot: Bot,
    chat_id: ChatId,
}

impl ChatFeedback {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    async fn send_markdown(
        &self,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> ResponseResult<Message> {
        let mut request = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await
    }

    pub async fn notify(&self, kind: FeedbackType, message: &str) -> ResponseResult<Message> {
        self.send_markdown(format_feedback(kind, message), None).await
    }

    /// Tell the user why an answer was not taken
    pub async fn reject(&self, reason: &str) -> ResponseResult<Message> {
        self.send_markdown(format_rejection(reason), None).await
    }

    /// Report a failed submission with a button that retries it
    pub async fn submit_failed(&self, message: &str) -> ResponseResult<Message> {
        let retry = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "🔁 Retry",
            RETRY_CALLBACK,
        )]]);
        self.send_markdown(format_feedback(FeedbackType::Error, message), Some(retry))
            .await
    }
}
