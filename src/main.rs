//! # Survey Bot Main Entry Point
//!
//! Initializes logging, loads configuration and the question set, builds the
//! answer sink, and runs the Telegram bot next to the health server.

use anyhow::Result;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use survey_bot::bot::handlers::BotHandler;
use survey_bot::bot::{SurveyContext, SurveyStorage};
use survey_bot::config::{Config, Messages};
use survey_bot::services::health::HealthService;
use survey_bot::survey::QuestionSet;
use survey_bot::utils::logging::log_system_event;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survey_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Survey Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded - Questions: {}, Messages: {}, HTTP Port: {}",
        config.question_file.display(), config.config_file.display(), config.http_port);

    let questions = QuestionSet::load(&config.question_file)?;
    let messages = Messages::load(&config.config_file)?;
    let sink = config.sink.build();
    log_system_event(
        "survey loaded",
        Some(&format!("{} questions, sink '{}'", questions.len(), sink.name())),
    );

    let context = Arc::new(SurveyContext::new(questions, messages, sink));

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(context.clone());
    info!("Telegram bot initialized successfully");

    // Initialize health service
    let health_service = HealthService::new(context);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        let storage: Arc<SurveyStorage> = SurveyStorage::new();
        Dispatcher::builder(bot, handler.schema())
            .dependencies(dptree::deps![storage])
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    info!("Application stopped");
    Ok(())
}
