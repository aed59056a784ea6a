use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::Command;
use crate::bot::driver::{run_event, Origin};
use crate::bot::{HandlerResult, SurveyContext, SurveyDialogue};
use crate::survey::{Event, Input};
use crate::utils::feedback::{ChatFeedback, FeedbackType};
use crate::utils::logging::log_command;

fn origin_of(msg: &Message) -> Origin {
    Origin {
        chat_id: msg.chat.id,
        first_name: msg.from().map(|u| u.first_name.clone()).unwrap_or_default(),
        callback_message: None,
    }
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: SurveyDialogue,
    ctx: Arc<SurveyContext>,
) -> HandlerResult {
    let user_id = msg.from().map(|u| u.id.0).unwrap_or(0);
    let username = msg.from().and_then(|u| u.username.as_deref()).unwrap_or("unknown");
    log_command(&format!("{cmd:?}"), username, user_id, msg.chat.id.0);

    let event = match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
            return Ok(());
        }
        Command::Start => Event::Start,
        Command::Skip => Event::Skip,
        Command::Cancel => Event::Cancel,
    };
    run_event(&bot, &ctx, &dialogue, origin_of(&msg), event).await
}

/// Plain messages: typed answers, or hints for mistyped commands
pub async fn answer_handler(
    bot: Bot,
    msg: Message,
    dialogue: SurveyDialogue,
    ctx: Arc<SurveyContext>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        tracing::debug!("Ignoring non-text message in chat {}", msg.chat.id.0);
        return Ok(());
    };

    if text.starts_with('/') {
        let command = text.split_whitespace().next().unwrap_or(text);
        ChatFeedback::new(bot.clone(), msg.chat.id)
            .notify(
                FeedbackType::Info,
                &format!("Unknown command: {command}. Use /help to see all available commands."),
            )
            .await?;
        return Ok(());
    }

    let event = Event::Answer(Input::Typed(text.to_string()));
    run_event(&bot, &ctx, &dialogue, origin_of(&msg), event).await
}
