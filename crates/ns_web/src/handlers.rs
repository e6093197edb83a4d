use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ns_core::Report;
use ns_sources::{ReportRequest, SourceInfo};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AudioPayload {
    pub mime_type: String,
    /// Base64 of the MP3 bytes.
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    pub audio: Option<AudioPayload>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        let audio = report.audio().map(|clip| AudioPayload {
            mime_type: clip.mime_type.clone(),
            data: STANDARD.encode(&clip.bytes),
        });
        Self { report, audio }
    }
}

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    tracing::info!("📨 Report requested for '{}' from {}", request.company, request.provider);
    let report = state.manager.generate(&request).await?;
    Ok(Json(report.into()))
}

pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<Vec<SourceInfo>> {
    Json(state.manager.sources())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
