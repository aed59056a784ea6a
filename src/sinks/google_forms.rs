use async_trait::async_trait;

use crate::sinks::{check_status, AnswerSink, SinkError};
use crate::survey::AnswerRecord;

const DEFAULT_BASE_URL: &str = "https://docs.google.com";

/// Submits each completed survey as a Google Forms response.
///
/// Answers go out under the `form_entry` of their question. Questions
/// without an entry, and skipped questions, are left out.
pub struct GoogleFormsSink {
    base_url: String,
    form_id: String,
    timestamp_entry: Option<String>,
    http_client: reqwest::Client,
}

impl GoogleFormsSink {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            form_id: form_id.into(),
            timestamp_entry: None,
            http_client: reqwest::Client::new(),
        }
    }

    /// Set a custom base URL for the form service
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Also post the completion time under this entry
    pub fn with_timestamp_entry(mut self, entry: Option<String>) -> Self {
        self.timestamp_entry = entry;
        self
    }

    /// Endpoint the form posts to
    pub fn submit_url(&self) -> String {
        format!(
            "{}/forms/d/e/{}/formResponse",
            self.base_url.trim_end_matches('/'),
            self.form_id
        )
    }

    /// Form fields for a record, in question order
    pub fn form_data(&self, record: &AnswerRecord) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = record
            .answers
            .iter()
            .filter_map(|a| match (&a.form_entry, &a.value) {
                (Some(entry), Some(value)) => Some((entry.clone(), value.to_string())),
                _ => None,
            })
            .collect();
        if let Some(entry) = &self.timestamp_entry {
            fields.push((entry.clone(), record.timestamp()));
        }
        fields.push(("submit".to_string(), "Submit".to_string()));
        fields
    }
}

#[async_trait]
impl AnswerSink for GoogleFormsSink {
    fn name(&self) -> &'static str {
        "form"
    }

    async fn submit(&self, record: &AnswerRecord) -> Result<(), SinkError> {
        let fields = self.form_data(record);
        let response = self
            .http_client
            .post(self.submit_url())
            .form(&fields)
            .send()
            .await?;
        check_status(response).await?;

        tracing::info!(
            "Submitted session {} to form {} ({} fields)",
            record.session_id,
            self.form_id,
            fields.len()
        );
        Ok(())
    }
}
