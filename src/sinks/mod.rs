//! Destinations for completed surveys.
//!
//! Every sink performs exactly one write per [`AnswerRecord`]. There is no
//! batching and no idempotency key, so submitting the same record twice
//! stores it twice.

pub mod google_forms;
pub mod google_sheets;
pub mod json_file;

use async_trait::async_trait;
use thiserror::Error;

use crate::survey::AnswerRecord;

pub use google_forms::GoogleFormsSink;
pub use google_sheets::GoogleSheetsSink;
pub use json_file::JsonFileSink;

/// Errors from writing a completed survey
#[derive(Error, Debug)]
pub enum SinkError {
    /// Network or connection error
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// The remote service answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Writing a local file failed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Serializing the record failed
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// The sink is misconfigured
    #[error("Invalid sink configuration: {0}")]
    Config(String),
}

impl SinkError {
    /// Create an API error
    pub fn api_error(status: u16, message: String) -> Self {
        Self::Api { status, message }
    }
}

/// A place completed surveys are written to
#[async_trait]
pub trait AnswerSink: Send + Sync {
    /// Short name for logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Store one completed survey
    async fn submit(&self, record: &AnswerRecord) -> Result<(), SinkError>;
}

/// Turn a non-success response into [`SinkError::Api`]
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SinkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SinkError::api_error(status.as_u16(), message))
}
