// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision collaborators for document images
//!
//! This module provides:
//! - Image decoding and PNG re-encoding of uploads
//! - Local OCR via the Tesseract command-line engine
//! - A client for a remote vision-language model (OpenAI-compatible API)

pub mod image_utils;
pub mod tesseract;
pub mod vlm_client;

pub use image_utils::{
    decode_image_bytes, detect_format, encode_png, encode_png_base64, format_to_extension, ImageError,
    ImageInfo, MAX_IMAGE_SIZE,
};
pub use tesseract::{resolve_ocr_engine, EngineHandle, OcrError, OcrOutput, TesseractEngine};
pub use vlm_client::{VlmClient, VlmError, EXTRACTION_PROMPT};
