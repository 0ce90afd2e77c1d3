// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recovery of a JSON object from a model's chat response
//!
//! Response shapes and fence openers are ordered matchers: each is tried in
//! sequence and the first that applies wins.

use serde_json::{json, Value};
use tracing::warn;

use super::{ExtractionError, ExtractionResult};

/// Where the assistant text may live in an API response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    /// OpenAI-compatible `choices[0].message.content`
    ChatChoices,
    /// Top-level `text`
    Text,
    /// Top-level `output`
    Output,
}

impl ContentShape {
    pub const PRIORITY: [ContentShape; 3] = [
        ContentShape::ChatChoices,
        ContentShape::Text,
        ContentShape::Output,
    ];

    /// Returns the content when this shape is present in `body`; a present
    /// shape with missing or null content yields an empty string
    pub fn extract(&self, body: &Value) -> Option<String> {
        match self {
            ContentShape::ChatChoices => {
                let first = body.get("choices")?.as_array()?.first()?;
                Some(content_to_string(&first["message"]["content"]))
            }
            ContentShape::Text => body.get("text").map(content_to_string),
            ContentShape::Output => body.get("output").map(content_to_string),
        }
    }
}

fn content_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pull the assistant text out of a response body
pub fn extract_content(body: &Value) -> Option<String> {
    ContentShape::PRIORITY
        .iter()
        .find_map(|shape| shape.extract(body))
}

/// Opening markdown fences a model may wrap its JSON in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceOpener {
    /// ```json
    Json,
    /// ``` with or without another language tag
    Plain,
}

impl FenceOpener {
    pub const ORDER: [FenceOpener; 2] = [FenceOpener::Json, FenceOpener::Plain];

    /// Remove this opener from an already-trimmed text, if it starts with it
    pub fn strip<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            FenceOpener::Json => text.strip_prefix("```json").map(str::trim),
            FenceOpener::Plain => {
                let rest = text.strip_prefix("```")?;
                let stripped = match text.find('\n') {
                    Some(idx) => &text[idx + 1..],
                    None => rest,
                };
                Some(stripped.trim())
            }
        }
    }
}

/// Strip surrounding whitespace and markdown code fences
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let opened = FenceOpener::ORDER
        .iter()
        .find_map(|opener| opener.strip(trimmed))
        .unwrap_or(trimmed);

    match opened.strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => opened,
    }
}

/// Narrow to the span from the first `{` to the last `}` inclusive, when
/// both exist in that order
pub fn narrow_to_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Turn model text into an extraction result
///
/// Objects are returned as-is, any other JSON value is wrapped under
/// `extracted_data`, and unparseable text becomes a
/// [`ExtractionError::JsonParse`] diagnostic carrying the attempted text.
pub fn parse_model_output(content: &str) -> Result<ExtractionResult, ExtractionError> {
    let cleaned = strip_code_fences(content);
    let candidate = narrow_to_object(cleaned);

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            let mut map = ExtractionResult::new();
            map.insert("extracted_data".to_string(), other);
            Ok(map)
        }
        Err(e) => {
            warn!(
                "JSON parsing error: {}; attempted to parse: {}...",
                e,
                truncate_for_diagnostics(candidate, 200)
            );
            Err(ExtractionError::JsonParse {
                reason: e.to_string(),
                raw_content: candidate.to_string(),
            })
        }
    }
}

/// Truncate on a character boundary, marking the cut with `...`
pub fn truncate_for_diagnostics(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Keep a raw JSON payload as-is when small, otherwise replace it with its
/// truncated serialization
pub fn bound_value(value: &Value, max_chars: usize) -> Value {
    let serialized = value.to_string();
    if serialized.chars().count() <= max_chars {
        value.clone()
    } else {
        json!(truncate_for_diagnostics(&serialized, max_chars))
    }
}
