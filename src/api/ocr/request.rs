// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload parsing for POST /ocr

use axum::body::Bytes;
use axum_extra::extract::Multipart;
use tracing::debug;

use crate::api::errors::ApiError;

/// Name of the multipart field carrying the document image
pub const FILE_FIELD: &str = "file";

/// The uploaded document, as received
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl ImageUpload {
    /// Read the `file` field, ignoring every other field
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut upload = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ApiError::InvalidRequest(format!("Failed to read multipart field: {}", e))
        })? {
            let name = field.name().unwrap_or_default().to_string();
            // first `file` field wins
            if name != FILE_FIELD || upload.is_some() {
                debug!("Ignoring multipart field '{}'", name);
                continue;
            }

            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                ApiError::InvalidRequest(format!("Failed to read file data: {}", e))
            })?;

            upload = Some(ImageUpload {
                bytes,
                file_name,
                content_type,
            });
        }

        let upload =
            upload.ok_or_else(|| ApiError::InvalidRequest("No image file provided".to_string()))?;

        if upload.bytes.is_empty() {
            return Err(ApiError::InvalidRequest("Uploaded file is empty".to_string()));
        }

        Ok(upload)
    }
}
