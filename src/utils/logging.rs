use tracing::{error, info, warn, debug};

use crate::survey::QuestionId;

/// Logs an incoming command with consistent format
pub fn log_command(command: &str, user: &str, user_id: u64, chat_id: i64) {
    info!("CMD: {} by {}({}) in chat {}", command, user, user_id, chat_id);
}

/// Logs a survey transition with consistent format
pub fn log_survey_event(event: &str, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("SURVEY: {} in chat {} - {}", event, chat_id, d),
        None => info!("SURVEY: {} in chat {}", event, chat_id),
    }
}

/// Logs a rejected answer with consistent format
pub fn log_rejected_answer(question_id: QuestionId, value: &str, reason: &str, chat_id: i64) {
    debug!(
        "REJECTED: question {} value '{}' in chat {} - {}",
        question_id, value, chat_id, reason
    );
}

/// Logs a session dropped because it no longer matched the question set
pub fn log_session_error(chat_id: i64, error: &str) {
    error!("SESSION_ERROR: chat {} - {}", chat_id, error);
}

/// Logs a successful sink write with consistent format
pub fn log_sink_write(sink: &str, session_id: &str, chat_id: i64) {
    info!("SINK_WRITE: {} stored session {} from chat {}", sink, session_id, chat_id);
}

/// Logs a failed sink write with consistent format
pub fn log_sink_error(sink: &str, session_id: &str, chat_id: i64, error: &str) {
    warn!(
        "SINK_ERROR: {} failed for session {} from chat {} - {}",
        sink, session_id, chat_id, error
    );
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
