// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Health endpoint tests for GET /health

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
};
use doc_field_extractor::{
    api::http_server::{create_app, AppState},
    config::{ServiceConfig, StrategyKind},
    extraction::build_extractor,
    version::VERSION_NUMBER,
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

async fn get_health(config: ServiceConfig) -> (StatusCode, Value) {
    let extractor = build_extractor(&config).unwrap();
    let app = create_app(AppState::new(config, extractor));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_llm_with_key_is_healthy() {
    let mut config = ServiceConfig::default();
    config.llm.api_key = Some("test-key".to_string());

    let (status, body) = get_health(config).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["strategy"], "llm");
    assert_eq!(body["version"], VERSION_NUMBER);
    assert!(body.get("issues").is_none());
}

#[tokio::test]
async fn test_health_llm_without_key_is_degraded() {
    let (status, body) = get_health(ServiceConfig::default()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["strategy"], "llm");
    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].as_str().unwrap().contains("OPENROUTER_API_KEY"));
}

#[tokio::test]
async fn test_health_reports_local_ocr_strategy() {
    let mut config = ServiceConfig::default();
    config.strategy = StrategyKind::LocalOcr;
    config.ocr.tesseract_path = Some("/definitely/not/here/tesseract".into());

    let (status, body) = get_health(config).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategy"], "local-ocr");
    assert_eq!(body["status"], "degraded");
    assert!(body["issues"][0]
        .as_str()
        .unwrap()
        .contains("/definitely/not/here/tesseract"));
}
