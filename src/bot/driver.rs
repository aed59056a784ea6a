//! Runs survey events for a chat: loads the dialogue state, applies
//! [`transition`], performs the resulting effects and stores the new state.

use teloxide::dispatching::dialogue::InMemStorageError;
use teloxide::prelude::*;
use teloxide::types::{KeyboardRemove, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use thiserror::Error;

use crate::bot::{render, HandlerResult, SurveyContext, SurveyDialogue};
use crate::survey::question::DONE_CHOICE;
use crate::survey::{
    after_submit, transition, AnswerRecord, Effect, Event, SurveyError, SurveyState,
};
use crate::utils::feedback::{ChatFeedback, FeedbackType};
use crate::utils::logging::{
    log_rejected_answer, log_session_error, log_sink_error, log_sink_write, log_survey_event,
};
use crate::utils::markdown::escape_markdown;

/// Where the event came from
#[derive(Debug, Clone)]
pub struct Origin {
    pub chat_id: ChatId,
    pub first_name: String,
    /// Message carrying the pressed inline button, for callback events
    pub callback_message: Option<MessageId>,
}

#[derive(Error, Debug)]
enum EffectError {
    #[error(transparent)]
    Survey(#[from] SurveyError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Storage(#[from] InMemStorageError),
}

/// Feed one event into the chat's survey
pub async fn run_event(
    bot: &Bot,
    ctx: &SurveyContext,
    dialogue: &SurveyDialogue,
    origin: Origin,
    event: Event,
) -> HandlerResult {
    let chat_id = origin.chat_id;
    let state = dialogue.get_or_default().await?;
    let raw = match &event {
        Event::Answer(input) => input.value().to_string(),
        _ => String::new(),
    };

    let step = match transition(&ctx.questions, state, event) {
        Ok(step) => step,
        Err(e) => return abort_session(bot, dialogue, chat_id, &e).await,
    };

    let mut state = step.state;
    for effect in step.effects {
        if let (Effect::Rejected(reason), Some(session)) = (&effect, state.session()) {
            log_rejected_answer(session.question_id, &raw, reason, chat_id.0);
        }
        match apply(bot, ctx, dialogue, &origin, &mut state, effect).await {
            Ok(()) => {}
            Err(EffectError::Survey(e)) => return abort_session(bot, dialogue, chat_id, &e).await,
            Err(EffectError::Request(e)) => {
                // Keep the transition even when Telegram fails
                store(dialogue, state).await?;
                return Err(e.into());
            }
            Err(EffectError::Storage(e)) => return Err(e.into()),
        }
    }

    store(dialogue, state).await?;
    Ok(())
}

async fn store(dialogue: &SurveyDialogue, state: SurveyState) -> Result<(), InMemStorageError> {
    match state {
        // Removal only fails when nothing was stored
        SurveyState::Idle => dialogue.exit().await.or(Ok(())),
        state => dialogue.update(state).await,
    }
}

/// An edit that would leave the message as it is counts as done
fn ignore_unmodified(result: Result<Message, RequestError>) -> Result<(), RequestError> {
    match result {
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Drop a session that no longer matches the question set
async fn abort_session(
    bot: &Bot,
    dialogue: &SurveyDialogue,
    chat_id: ChatId,
    error: &SurveyError,
) -> HandlerResult {
    log_session_error(chat_id.0, &error.to_string());
    store(dialogue, SurveyState::Idle).await?;
    ChatFeedback::new(bot.clone(), chat_id)
        .notify(
            FeedbackType::Error,
            "Something went wrong, so this survey was stopped. Press /start to begin again.",
        )
        .await?;
    Ok(())
}

async fn apply(
    bot: &Bot,
    ctx: &SurveyContext,
    dialogue: &SurveyDialogue,
    origin: &Origin,
    state: &mut SurveyState,
    effect: Effect,
) -> Result<(), EffectError> {
    let chat_id = origin.chat_id;
    let feedback = ChatFeedback::new(bot.clone(), chat_id);

    match effect {
        Effect::Welcome => {
            let text = format!(
                "👋 *Welcome {}*\n\n{}",
                escape_markdown(&origin.first_name),
                escape_markdown(&ctx.messages.welcome_message)
            );
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(render::welcome_keyboard())
                .await?;
            log_survey_event("welcome", chat_id.0, None);
        }
        Effect::Accepted => {
            let text = escape_markdown(&format!(
                "{}\n\nPress /cancel to cancel.",
                ctx.messages.accepted_message
            ));
            match origin.callback_message {
                Some(message_id) => {
                    bot.edit_message_text(chat_id, message_id, text)
                        .parse_mode(ParseMode::MarkdownV2)
                        .await?;
                }
                None => {
                    bot.send_message(chat_id, text)
                        .parse_mode(ParseMode::MarkdownV2)
                        .await?;
                }
            }
            let session_id = state.session().map(|s| s.id.to_string());
            log_survey_event("accepted", chat_id.0, session_id.as_deref());
        }
        Effect::Prompt(question_id) => {
            let question = ctx.questions.require(question_id)?;
            let Some(session) = state.session_mut() else {
                return Ok(());
            };
            let remaining = session
                .multiple
                .as_ref()
                .filter(|p| p.question_id == question_id)
                .map(|p| p.remaining.as_slice());

            let mut request = bot
                .send_message(chat_id, question.prompt_text())
                .parse_mode(ParseMode::MarkdownV2);
            if let Some(keyboard) = question.keyboard(remaining) {
                request = request.reply_markup(render::markup(&keyboard));
            }
            let sent = request.await?;
            session.remember_message(question_id, sent.id.0);
        }
        Effect::Refresh(question_id) => {
            let Some(session) = state.session() else {
                return Ok(());
            };
            let message_id = session
                .message_for(question_id)
                .ok_or(SurveyError::MissingMessage(question_id))?;
            let progress = session
                .multiple
                .as_ref()
                .filter(|p| p.question_id == question_id)
                .ok_or(SurveyError::MissingProgress(question_id))?;
            let edited = bot
                .edit_message_reply_markup(chat_id, MessageId(message_id))
                .reply_markup(render::inline_keyboard(&progress.remaining))
                .await;
            ignore_unmodified(edited)?;
        }
        Effect::Noted(_, choice) => {
            feedback
                .notify(
                    FeedbackType::Info,
                    &format!("Noted: {choice}. Pick more options or press {DONE_CHOICE}."),
                )
                .await?;
        }
        Effect::Answered(question_id) | Effect::Skipped(question_id) => {
            let question = ctx.questions.require(question_id)?;
            let Some(message_id) = state.session().and_then(|s| s.message_for(question_id)) else {
                tracing::warn!("No prompt to mark for question {} in chat {}", question_id, chat_id.0);
                return Ok(());
            };
            let text = if matches!(effect, Effect::Answered(_)) {
                question.answered_text()
            } else {
                question.skipped_text()
            };
            // Best effort, the user may have deleted the prompt
            let edited = bot
                .edit_message_text(chat_id, MessageId(message_id), text)
                .parse_mode(ParseMode::MarkdownV2)
                .await;
            if let Err(e) = ignore_unmodified(edited) {
                tracing::warn!(
                    "Failed to mark prompt of question {} in chat {}: {}",
                    question_id, chat_id.0, e
                );
            }
        }
        Effect::Rejected(reason) => {
            feedback.reject(&reason).await?;
        }
        Effect::Submit => {
            let Some(session) = state.session() else {
                return Ok(());
            };
            let record = AnswerRecord::from_session(&ctx.questions, session, chat_id.0);
            let session_id = record.session_id.to_string();
            let outcome = ctx.sink.submit(&record).await;
            *state = after_submit(std::mem::take(state), &outcome);
            match outcome {
                Ok(()) => {
                    log_sink_write(ctx.sink.name(), &session_id, chat_id.0);
                    // Persist before replying
                    store(dialogue, state.clone()).await?;
                    bot.send_message(chat_id, ctx.messages.completed_message.as_str())
                        .reply_markup(KeyboardRemove::new())
                        .await?;
                }
                Err(e) => {
                    log_sink_error(ctx.sink.name(), &session_id, chat_id.0, &e.to_string());
                    feedback
                        .submit_failed(
                            "Your answers could not be saved right now. Press Retry to try again, or /cancel to discard them.",
                        )
                        .await?;
                }
            }
        }
        Effect::Cancelled => {
            bot.send_message(chat_id, ctx.messages.cancel_message.as_str())
                .reply_markup(KeyboardRemove::new())
                .await?;
            log_survey_event("cancelled", chat_id.0, None);
        }
        Effect::AlreadyRunning => {
            feedback
                .notify(
                    FeedbackType::Warning,
                    "A survey is already in progress. Answer the current question or press /cancel to stop it.",
                )
                .await?;
        }
        Effect::NotRunning => {
            feedback
                .notify(
                    FeedbackType::Info,
                    "There is no survey in progress. Press /start to begin.",
                )
                .await?;
        }
    }
    Ok(())
}
