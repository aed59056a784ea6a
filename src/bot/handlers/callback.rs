use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::driver::{run_event, Origin};
use crate::bot::{HandlerResult, SurveyContext, SurveyDialogue, ACCEPT_CALLBACK};
use crate::survey::{Event, Input, SurveyState};
use crate::utils::feedback::RETRY_CALLBACK;

/// Map callback data to a survey event
pub fn event_for_callback(data: &str) -> Event {
    match data {
        ACCEPT_CALLBACK => Event::Accept,
        RETRY_CALLBACK => Event::Retry,
        choice => Event::Answer(Input::Button(choice.to_string())),
    }
}

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: SurveyDialogue,
    ctx: Arc<SurveyContext>,
) -> HandlerResult {
    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        bot.answer_callback_query(q.id.clone())
            .text("Invalid callback data format")
            .await?;
        return Ok(());
    };

    tracing::info!(
        "Callback received: '{}' from user {} in chat {}",
        data, q.from.id.0, message.chat.id.0
    );

    let event = event_for_callback(data);
    if let Event::Answer(_) = event {
        // Buttons of earlier prompts stay visible until edited
        let state = dialogue.get_or_default().await?;
        if let SurveyState::Answering(session) = &state {
            if !session.is_current_prompt(message.id.0) {
                bot.answer_callback_query(q.id.clone())
                    .text("This question was already answered.")
                    .await?;
                return Ok(());
            }
        }
    }
    bot.answer_callback_query(q.id.clone()).await?;

    let origin = Origin {
        chat_id: message.chat.id,
        first_name: q.from.first_name.clone(),
        callback_message: Some(message.id),
    };
    run_event(&bot, &ctx, &dialogue, origin, event).await
}
