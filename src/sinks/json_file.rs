use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::sinks::{AnswerSink, SinkError};
use crate::survey::{AnswerRecord, AnswerValue, QuestionId};

/// Writes each completed survey to its own JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

#[derive(Serialize)]
struct JsonAnswers<'a> {
    session_id: Uuid,
    chat_id: i64,
    submitted_at: DateTime<Utc>,
    answers: BTreeMap<QuestionId, &'a AnswerValue>,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the files land in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a record: completion time first so files sort by date
    pub fn path_for(&self, record: &AnswerRecord) -> PathBuf {
        self.dir.join(format!(
            "{}-{}.json",
            record.completed_at.format("%Y%m%dT%H%M%S"),
            record.session_id
        ))
    }
}

#[async_trait]
impl AnswerSink for JsonFileSink {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn submit(&self, record: &AnswerRecord) -> Result<(), SinkError> {
        let body = JsonAnswers {
            session_id: record.session_id,
            chat_id: record.chat_id,
            submitted_at: record.completed_at,
            answers: record
                .answers
                .iter()
                .filter_map(|a| a.value.as_ref().map(|v| (a.question_id, v)))
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&body)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(record);
        tokio::fs::write(&path, json).await?;

        tracing::info!("Wrote answers of session {} to {}", record.session_id, path.display());
        Ok(())
    }
}
