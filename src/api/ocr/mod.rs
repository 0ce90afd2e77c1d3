// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR API endpoint module
//!
//! Provides POST /ocr for extracting fields from uploaded document images.

pub mod handler;
pub mod request;

pub use handler::ocr_handler;
pub use request::{ImageUpload, FILE_FIELD};
