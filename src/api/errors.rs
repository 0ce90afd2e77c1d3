// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::fmt;

use crate::extraction::ExtractionError;
use crate::vision::ImageError;

#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    Extraction(ExtractionError),
}

impl ApiError {
    pub fn to_body(&self) -> Value {
        match self {
            ApiError::InvalidRequest(msg) => json!({ "error": msg }),
            ApiError::Extraction(e) => e.to_body(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::Extraction(e) if e.is_recoverable() => 200,
            ApiError::Extraction(e) => match e {
                ExtractionError::ImageDecode(_) => 400,
                ExtractionError::Config(_) | ExtractionError::EngineUnavailable(_) => 503,
                ExtractionError::HttpStatus { .. } | ExtractionError::Network(_) => 502,
                ExtractionError::Timeout(_) => 504,
                _ => 500,
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Extraction(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ExtractionError> for ApiError {
    fn from(e: ExtractionError) -> Self {
        ApiError::Extraction(e)
    }
}

impl From<ImageError> for ApiError {
    fn from(e: ImageError) -> Self {
        ApiError::Extraction(ExtractionError::ImageDecode(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_body())).into_response()
    }
}
