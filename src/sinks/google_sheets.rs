use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use crate::sinks::{check_status, AnswerSink, SinkError};
use crate::survey::AnswerRecord;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Appends one row per completed survey to a Google Sheets range.
///
/// Authentication is a pre-issued OAuth access token; obtaining and
/// refreshing it happens outside the bot.
pub struct GoogleSheetsSink {
    base_url: String,
    sheet_id: String,
    range: String,
    access_token: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_cells: Option<u64>,
}

impl GoogleSheetsSink {
    pub fn new(
        sheet_id: impl Into<String>,
        range: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sheet_id: sheet_id.into(),
            range: range.into(),
            access_token: access_token.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn append_url(&self) -> Result<Url, SinkError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SinkError::Config(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| SinkError::Config(format!("base url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.sheet_id.as_str(), "values"])
            .push(&format!("{}:append", self.range));
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }

    /// The row appended for a record: timestamp, then one cell per question
    pub fn row(record: &AnswerRecord) -> Vec<String> {
        let mut row = vec![record.timestamp()];
        row.extend(record.values());
        row
    }
}

#[async_trait]
impl AnswerSink for GoogleSheetsSink {
    fn name(&self) -> &'static str {
        "sheet"
    }

    async fn submit(&self, record: &AnswerRecord) -> Result<(), SinkError> {
        let body = json!({ "values": [Self::row(record)] });

        let response = self
            .http_client
            .post(self.append_url()?)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let appended: AppendResponse = response.json().await?;
        let cells = appended
            .updates
            .and_then(|u| u.updated_cells)
            .unwrap_or_default();
        tracing::info!(
            "Appended session {} to sheet {}: {} cells",
            record.session_id,
            self.sheet_id,
            cells
        );
        Ok(())
    }
}
