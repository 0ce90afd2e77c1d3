// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Field extraction strategies
//!
//! Exactly one strategy runs per deployment, chosen by
//! [`StrategyKind`](crate::config::StrategyKind):
//! - [`LocalOcrExtractor`]: Tesseract text plus regex fields
//! - [`RemoteLlmExtractor`]: a vision model asked to answer in JSON

pub mod fields;
pub mod local_ocr;
pub mod remote_llm;
pub mod response;

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::{ServiceConfig, StrategyKind};
use crate::vision::{ImageError, OcrError, TesseractEngine, VlmClient, VlmError};

pub use fields::{extract_fields, DocumentFields};
pub use local_ocr::LocalOcrExtractor;
pub use remote_llm::RemoteLlmExtractor;

/// Field name to extracted value, returned as the HTTP body
pub type ExtractionResult = Map<String, Value>;

/// Upper bound for any raw payload echoed back in a diagnostic body
pub const MAX_DIAGNOSTIC_CHARS: usize = 4096;

/// Every way an extraction can fail
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{0}")]
    Config(String),

    #[error("Invalid image: {0}")]
    ImageDecode(#[from] ImageError),

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("{0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error: {status}")]
    HttpStatus {
        status: u16,
        body: String,
        model: String,
    },

    #[error("Unexpected API response format")]
    UnexpectedResponseFormat { raw_response: Value },

    #[error("Empty response from API")]
    EmptyResponse { raw_response: Value },

    #[error("Failed to parse JSON response")]
    JsonParse { reason: String, raw_content: String },
}

impl ExtractionError {
    /// Recoverable errors are diagnostics about model output, not failures
    /// of the service, and are returned to the caller as a normal response.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractionError::UnexpectedResponseFormat { .. }
                | ExtractionError::EmptyResponse { .. }
                | ExtractionError::JsonParse { .. }
        )
    }

    /// Render the error as a JSON object with an `error` key plus bounded
    /// diagnostic context
    pub fn to_body(&self) -> Value {
        match self {
            ExtractionError::HttpStatus {
                status,
                body,
                model,
            } => json!({
                "error": self.to_string(),
                "status": status,
                "attempted_model": model,
                "details": response::truncate_for_diagnostics(body, MAX_DIAGNOSTIC_CHARS),
            }),
            ExtractionError::UnexpectedResponseFormat { raw_response }
            | ExtractionError::EmptyResponse { raw_response } => json!({
                "error": self.to_string(),
                "raw_response": response::bound_value(raw_response, MAX_DIAGNOSTIC_CHARS),
            }),
            ExtractionError::JsonParse {
                reason,
                raw_content,
            } => json!({
                "error": self.to_string(),
                "raw_content": response::truncate_for_diagnostics(raw_content, MAX_DIAGNOSTIC_CHARS),
                "message": "The model returned text that couldn't be parsed as JSON. Raw content included in response.",
                "details": reason,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl From<OcrError> for ExtractionError {
    fn from(e: OcrError) -> Self {
        match e {
            OcrError::EngineUnavailable(reason) => ExtractionError::EngineUnavailable(reason),
            OcrError::Timeout(_) => ExtractionError::Timeout(e.to_string()),
            OcrError::OcrFailed(_) | OcrError::Io(_) => ExtractionError::OcrFailed(e.to_string()),
        }
    }
}

/// A single extraction strategy
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    fn strategy(&self) -> StrategyKind;

    /// Why this strategy cannot currently succeed, if known up front
    fn readiness_issue(&self) -> Option<String>;

    async fn extract(&self, image: &DynamicImage) -> Result<ExtractionResult, ExtractionError>;
}

/// Build the configured strategy; engine discovery happens here, once
pub fn build_extractor(config: &ServiceConfig) -> Result<Arc<dyn FieldExtractor>, ExtractionError> {
    match config.strategy {
        StrategyKind::LocalOcr => {
            let engine = TesseractEngine::resolve(&config.ocr);
            Ok(Arc::new(LocalOcrExtractor::new(engine)))
        }
        StrategyKind::Llm => {
            let client = VlmClient::new(&config.llm).map_err(|e| match e {
                VlmError::Network(msg) | VlmError::Timeout(msg) => {
                    ExtractionError::Config(format!("failed to build HTTP client: {}", msg))
                }
                other => ExtractionError::Config(other.to_string()),
            })?;
            Ok(Arc::new(RemoteLlmExtractor::new(client)))
        }
    }
}
