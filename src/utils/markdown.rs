//! Telegram MarkdownV2 helpers.
//!
//! Question texts, descriptions and message templates come from configuration
//! and may contain any character, so everything dynamic goes through
//! [`escape_markdown`] before it is sent in MarkdownV2 mode.

/// Backslash-escape every character MarkdownV2 treats as markup.
///
/// ```
/// use survey_bot::utils::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("1. Age (years)"), "1\\. Age \\(years\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('_', "\\_")
        .replace('*', "\\*")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('~', "\\~")
        .replace('`', "\\`")
        .replace('>', "\\>")
        .replace('#', "\\#")
        .replace('+', "\\+")
        .replace('-', "\\-")
        .replace('=', "\\=")
        .replace('|', "\\|")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('.', "\\.")
        .replace('!', "\\!")
}
