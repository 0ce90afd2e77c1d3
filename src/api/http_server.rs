// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::health_handler;
use super::ocr::ocr_handler;
use crate::config::ServiceConfig;
use crate::extraction::FieldExtractor;
use crate::vision::MAX_IMAGE_SIZE;

/// Room for multipart framing on top of the image cap; the image size
/// itself is enforced after the field is read
const BODY_LIMIT: usize = MAX_IMAGE_SIZE + 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub extractor: Arc<dyn FieldExtractor>,
}

impl AppState {
    pub fn new(config: ServiceConfig, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/ocr", post(ocr_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_addr.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!("Extraction API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
