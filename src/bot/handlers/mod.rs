pub mod callback;
pub mod message;

use std::sync::Arc;
use teloxide::{
    dispatching::{dialogue, UpdateHandler},
    prelude::*,
};

use crate::bot::commands::Command;
use crate::bot::{SurveyContext, SurveyDialogue, SurveyStorage};
use crate::survey::SurveyState;

pub struct BotHandler {
    pub context: Arc<SurveyContext>,
}

impl BotHandler {
    pub fn new(context: Arc<SurveyContext>) -> Self {
        Self { context }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        use teloxide::dispatching::UpdateFilterExt;

        let ctx_command = self.context.clone();
        let ctx_message = self.context.clone();
        let ctx_callback = self.context.clone();

        dialogue::enter::<Update, SurveyStorage, SurveyState, _>()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command, dialogue: SurveyDialogue| {
                        let ctx = ctx_command.clone();
                        async move { message::command_handler(bot, msg, cmd, dialogue, ctx).await }
                    }),
            )
            .branch(
                Update::filter_message().endpoint(move |bot: Bot, msg: Message, dialogue: SurveyDialogue| {
                    let ctx = ctx_message.clone();
                    async move { message::answer_handler(bot, msg, dialogue, ctx).await }
                }),
            )
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery, dialogue: SurveyDialogue| {
                    let ctx = ctx_callback.clone();
                    async move { callback::callback_handler(bot, q, dialogue, ctx).await }
                },
            ))
    }
}
