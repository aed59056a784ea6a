//! HTTP health endpoints served next to the bot.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::bot::SurveyContext;

/// Body of `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub survey: SurveySummary,
}

/// What the running bot asks and where answers go
#[derive(Debug, Serialize, Deserialize)]
pub struct SurveySummary {
    pub questions: usize,
    pub required_questions: usize,
    pub sink: String,
}

impl SurveySummary {
    fn of(context: &SurveyContext) -> Self {
        Self {
            questions: context.questions.len(),
            required_questions: context.questions.iter().filter(|q| q.required).count(),
            sink: context.sink.name().to_string(),
        }
    }
}

#[derive(Clone)]
struct HealthState {
    context: Arc<SurveyContext>,
    started_at: DateTime<Utc>,
}

impl HealthState {
    fn uptime_seconds(&self) -> u64 {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        u64::try_from(elapsed.num_seconds()).unwrap_or_default()
    }
}

/// Router with `/health`, `/health/ready` and `/health/live`
pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(context: Arc<SurveyContext>) -> Self {
        let state = HealthState {
            context,
            started_at: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(report))
            .route("/health/ready", get(ready))
            .route("/health/live", get(live))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn report(State(state): State<HealthState>) -> Result<Json<HealthReport>, StatusCode> {
    if state.context.questions.is_empty() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthReport {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        uptime_seconds: state.uptime_seconds(),
        survey: SurveySummary::of(&state.context),
    }))
}

/// Ready once questions are loaded; the sink is only exercised on submit
async fn ready(State(state): State<HealthState>) -> (StatusCode, Json<&'static str>) {
    if state.context.questions.is_empty() {
        (StatusCode::SERVICE_UNAVAILABLE, Json("loading"))
    } else {
        (StatusCode::OK, Json("ready"))
    }
}

async fn live() -> Json<&'static str> {
    Json("alive")
}
