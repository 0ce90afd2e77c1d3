// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub strategy: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

/// GET /health - degraded when the active strategy cannot currently succeed
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let issues: Vec<String> = state.extractor.readiness_issue().into_iter().collect();

    Json(HealthResponse {
        status: if issues.is_empty() { "healthy" } else { "degraded" }.to_string(),
        strategy: state.extractor.strategy().to_string(),
        version: version::VERSION_NUMBER.to_string(),
        issues: if issues.is_empty() { None } else { Some(issues) },
    })
}
