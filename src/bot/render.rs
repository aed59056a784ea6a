use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::bot::ACCEPT_CALLBACK;
use crate::survey::Keyboard;

/// Inline keyboard whose buttons send their own label as callback data
pub fn inline_keyboard(rows: &[Vec<String>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|label| InlineKeyboardButton::callback(label.clone(), label.clone()))
            .collect::<Vec<_>>()
    }))
}

/// Telegram markup for a prompt keyboard
pub fn markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Inline(rows) => ReplyMarkup::InlineKeyboard(inline_keyboard(rows)),
        Keyboard::Reply(rows) => {
            let buttons = rows
                .iter()
                .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>());
            ReplyMarkup::Keyboard(
                KeyboardMarkup::new(buttons)
                    .resize_keyboard(true)
                    .one_time_keyboard(true),
            )
        }
    }
}

/// Single "agree" button under the welcome message
pub fn welcome_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "✅ Agree and continue",
        ACCEPT_CALLBACK,
    )]])
}
