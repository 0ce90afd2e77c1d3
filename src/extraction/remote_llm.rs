// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote LLM strategy: a vision model asked to answer with a JSON object

use async_trait::async_trait;
use image::DynamicImage;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::response::{extract_content, parse_model_output};
use super::{ExtractionError, ExtractionResult, FieldExtractor};
use crate::config::StrategyKind;
use crate::vision::{encode_png_base64, VlmClient, VlmError};

pub struct RemoteLlmExtractor {
    client: VlmClient,
}

impl RemoteLlmExtractor {
    pub fn new(client: VlmClient) -> Self {
        Self { client }
    }

    fn map_client_error(&self, e: VlmError) -> ExtractionError {
        match e {
            VlmError::MissingApiKey => ExtractionError::Config(e.to_string()),
            VlmError::Timeout(_) => ExtractionError::Timeout(e.to_string()),
            VlmError::Network(_) => ExtractionError::Network(e.to_string()),
            VlmError::HttpStatus { status, body } => ExtractionError::HttpStatus {
                status,
                body,
                model: self.client.model_name().to_string(),
            },
            VlmError::InvalidBody(raw) => {
                warn!("LLM API returned a body that is not JSON");
                ExtractionError::UnexpectedResponseFormat {
                    raw_response: Value::String(raw),
                }
            }
        }
    }
}

#[async_trait]
impl FieldExtractor for RemoteLlmExtractor {
    fn strategy(&self) -> StrategyKind {
        StrategyKind::Llm
    }

    fn readiness_issue(&self) -> Option<String> {
        if self.client.has_api_key() {
            None
        } else {
            Some(VlmError::MissingApiKey.to_string())
        }
    }

    async fn extract(&self, image: &DynamicImage) -> Result<ExtractionResult, ExtractionError> {
        if !self.client.has_api_key() {
            warn!("Refusing LLM extraction: no API key configured");
            return Err(ExtractionError::Config(VlmError::MissingApiKey.to_string()));
        }

        let base64_png = encode_png_base64(image)?;
        let body = self
            .client
            .complete(&base64_png)
            .await
            .map_err(|e| self.map_client_error(e))?;

        let content = match extract_content(&body) {
            Some(content) => content,
            None => {
                warn!("Unexpected LLM API response format");
                return Err(ExtractionError::UnexpectedResponseFormat { raw_response: body });
            }
        };

        if content.is_empty() {
            warn!("LLM API returned empty content");
            return Err(ExtractionError::EmptyResponse { raw_response: body });
        }

        debug!("Model returned {} chars of content", content.len());
        let result = parse_model_output(&content)?;
        info!(
            "Model {} extracted {} top-level keys",
            self.client.model_name(),
            result.len()
        );
        Ok(result)
    }
}
