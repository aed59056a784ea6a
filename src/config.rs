use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::sinks::{AnswerSink, GoogleFormsSink, GoogleSheetsSink, JsonFileSink};

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub config_file: PathBuf,
    pub question_file: PathBuf,
    pub http_port: u16,
    pub sink: SinkConfig,
}

/// Where completed surveys are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Json {
        dir: PathBuf,
    },
    Sheet {
        sheet_id: String,
        range: String,
        access_token: String,
    },
    Form {
        form_id: String,
        timestamp_entry: Option<String>,
    },
}

impl SinkConfig {
    /// Build the configured sink
    pub fn build(&self) -> Arc<dyn AnswerSink> {
        match self {
            SinkConfig::Json { dir } => Arc::new(JsonFileSink::new(dir.clone())),
            SinkConfig::Sheet {
                sheet_id,
                range,
                access_token,
            } => Arc::new(GoogleSheetsSink::new(
                sheet_id.clone(),
                range.clone(),
                access_token.clone(),
            )),
            SinkConfig::Form {
                form_id,
                timestamp_entry,
            } => Arc::new(
                GoogleFormsSink::new(form_id.clone()).with_timestamp_entry(timestamp_entry.clone()),
            ),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let config_file = PathBuf::from(var_or("CONFIG_FILE", "data/config.json"));
        let question_file = PathBuf::from(var_or("QUESTION_FILE", "data/questions.json"));

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        Ok(Config {
            telegram_bot_token: token,
            config_file,
            question_file,
            http_port,
            sink: sink_from_env()?,
        })
    }
}

fn sink_from_env() -> Result<SinkConfig> {
    let kind = var_or("SINK", "json");
    match kind.trim().to_lowercase().as_str() {
        "json" => Ok(SinkConfig::Json {
            dir: PathBuf::from(var_or("ANSWERS_DIR", "data/answers")),
        }),
        "sheet" => Ok(SinkConfig::Sheet {
            sheet_id: required_var("GOOGLE_SHEET_ID")?,
            range: var_or("GOOGLE_SHEET_RANGE", "Sheet1!A1"),
            access_token: required_var("GOOGLE_SHEETS_TOKEN")?,
        }),
        "form" => Ok(SinkConfig::Form {
            form_id: required_var("GOOGLE_FORM_ID")?,
            timestamp_entry: env::var("GOOGLE_FORM_TIMESTAMP_ENTRY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }),
        other => Err(anyhow!("Invalid SINK '{other}', expected json, sheet or form")),
    }
}

/// Value of `name`, or `default` when unset or blank
fn var_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(anyhow!("{name} must be set")),
    }
}

/// Static texts shown around the survey, loaded from `CONFIG_FILE`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Messages {
    pub welcome_message: String,
    pub accepted_message: String,
    #[serde(default = "default_completed_message")]
    pub completed_message: String,
    #[serde(default = "default_cancel_message")]
    pub cancel_message: String,
}

fn default_completed_message() -> String {
    "You have successfully completed our survey.\n\nPress /start to start again.".to_string()
}

fn default_cancel_message() -> String {
    "I hope I will see you soon.".to_string()
}

impl Messages {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
