use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Survey bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the survey")]
    Start,
    #[command(description = "Skip the current optional question")]
    Skip,
    #[command(description = "Cancel the survey and discard your answers")]
    Cancel,
}
