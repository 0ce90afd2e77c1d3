// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handler

use std::time::Instant;

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::request::ImageUpload;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::extraction::ExtractionResult;
use crate::vision::{decode_image_bytes, format_to_extension};

/// POST /ocr - Extract fields from a document image
///
/// Accepts a multipart form with the image in field `file` and runs the
/// configured extraction strategy over it.
///
/// # Response
/// - local OCR: `{"text": ..., "fields": {"aadhar"?, "dob"?, "percentage"?}}`
/// - remote LLM: the model's JSON object, or `{"extracted_data": ...}`
///
/// # Errors
/// - 400 Bad Request: no `file` field, empty file, or undecodable image
/// - 200 OK with an `error` key: the model answered but its output could not be used
/// - 502 / 503 / 504 / 500: upstream, configuration, timeout, or engine failures
pub async fn ocr_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>, ApiError> {
    let request_id = Uuid::new_v4();
    let strategy = state.extractor.strategy();
    let start = Instant::now();

    let result = extract_upload(&state, multipart, request_id).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(fields) => info!(
            %request_id,
            %strategy,
            elapsed_ms,
            "Extraction completed with {} keys",
            fields.len()
        ),
        Err(e) => warn!(
            %request_id,
            %strategy,
            elapsed_ms,
            status = e.status_code(),
            "Extraction failed: {}",
            e
        ),
    }

    result.map(Json)
}

async fn extract_upload(
    state: &AppState,
    multipart: Multipart,
    request_id: Uuid,
) -> Result<ExtractionResult, ApiError> {
    let upload = ImageUpload::from_multipart(multipart).await?;
    info!(
        %request_id,
        bytes = upload.bytes.len(),
        file_name = upload.file_name.as_deref().unwrap_or("-"),
        content_type = upload.content_type.as_deref().unwrap_or("-"),
        "OCR request received"
    );

    let (image, image_info) = decode_image_bytes(&upload.bytes)?;
    debug!(
        %request_id,
        "Decoded image: {}x{}, {}, {} bytes",
        image_info.width,
        image_info.height,
        format_to_extension(image_info.format),
        image_info.size_bytes
    );

    Ok(state.extractor.extract(&image).await?)
}
