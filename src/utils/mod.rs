/// Feedback messages sent back to the user
pub mod feedback;
/// Structured log helpers
pub mod logging;
/// Telegram MarkdownV2 escaping
pub mod markdown;
