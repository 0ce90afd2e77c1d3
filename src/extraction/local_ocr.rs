// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local OCR strategy: Tesseract text followed by regex fields

use async_trait::async_trait;
use image::DynamicImage;
use serde_json::Value;
use tracing::{debug, info};

use super::fields::extract_fields;
use super::{ExtractionError, ExtractionResult, FieldExtractor};
use crate::config::StrategyKind;
use crate::vision::{encode_png, TesseractEngine};

pub struct LocalOcrExtractor {
    engine: TesseractEngine,
}

impl LocalOcrExtractor {
    pub fn new(engine: TesseractEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl FieldExtractor for LocalOcrExtractor {
    fn strategy(&self) -> StrategyKind {
        StrategyKind::LocalOcr
    }

    fn readiness_issue(&self) -> Option<String> {
        if self.engine.is_available() {
            None
        } else {
            Some(self.engine.availability_hint())
        }
    }

    async fn extract(&self, image: &DynamicImage) -> Result<ExtractionResult, ExtractionError> {
        let png = encode_png(image)?;
        debug!("Running tesseract over {} PNG bytes", png.len());

        let output = self.engine.recognize(png).await?;
        let fields = extract_fields(&output.text);
        info!(
            "OCR completed in {}ms: {} chars, {} fields matched",
            output.processing_time_ms,
            output.text.len(),
            fields.count()
        );

        let fields = serde_json::to_value(&fields)
            .map_err(|e| ExtractionError::OcrFailed(format!("failed to serialize fields: {}", e)))?;

        let mut result = ExtractionResult::new();
        result.insert("text".to_string(), Value::String(output.text));
        result.insert("fields".to_string(), fields);
        Ok(result)
    }
}
