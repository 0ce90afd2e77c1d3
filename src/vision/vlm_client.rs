// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote vision-language model client via OpenAI-compatible API

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;

/// Instruction sent with every document image
pub const EXTRACTION_PROMPT: &str = r#"Extract all information from this document image and return it as JSON.

Read all text, numbers, dates, names, and any other data visible in the image.
Organize everything into a JSON object with clear field names.

Return ONLY valid JSON, no markdown, no code blocks, no explanations. Just the JSON object.

Example:
{"name": "John Doe", "roll_number": "12345", "subjects": {"math": "95", "science": "88"}}"#;

const REFERER: &str = "https://github.com/your-repo";
const TITLE: &str = "OCR Field Extraction";

// --- OpenAI-compatible serde structs ---

#[derive(Debug, serde::Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, serde::Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: serde_json::Value,
}

/// Errors from the remote call itself, before any content is interpreted
#[derive(Debug, Error)]
pub enum VlmError {
    #[error("OPENROUTER_API_KEY or NEMOTRON_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Request to LLM API timed out: {0}")]
    Timeout(String),

    #[error("Error calling LLM API: {0}")]
    Network(String),

    #[error("HTTP error calling LLM API: {status}")]
    HttpStatus { status: u16, body: String },

    #[error("LLM API returned a non-JSON body")]
    InvalidBody(String),
}

impl From<reqwest::Error> for VlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            VlmError::Timeout(e.to_string())
        } else {
            VlmError::Network(e.to_string())
        }
    }
}

/// Client for a hosted vision model (OpenRouter by default)
pub struct VlmClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model_name: String,
    max_tokens: u32,
    temperature: f32,
}

impl VlmClient {
    /// Create a new client; the HTTP client and its timeout are built once
    pub fn new(config: &LlmConfig) -> Result<Self, VlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        info!(
            "LLM client configured: endpoint={}, model={}, api_key_set={}",
            config.api_url,
            config.model_name,
            config.api_key.is_some()
        );

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model_name: config.model_name.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Get the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the chat completion payload for one PNG image
    pub fn build_request(&self, base64_png: &str) -> ChatRequest {
        let data_url = format!("data:image/png;base64,{}", base64_png);

        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": EXTRACTION_PROMPT},
                    {"type": "image_url", "image_url": {"url": data_url}}
                ]),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Send one extraction request and return the decoded response body
    ///
    /// Fails with [`VlmError::MissingApiKey`] before touching the network when
    /// no key is configured. A single attempt is made.
    pub async fn complete(&self, base64_png: &str) -> Result<serde_json::Value, VlmError> {
        let api_key = self.api_key.as_deref().ok_or(VlmError::MissingApiKey)?;

        let request = self.build_request(base64_png);
        debug!(
            "Sending extraction request: model={}, image_b64_len={}",
            self.model_name,
            base64_png.len()
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                "HTTP error calling LLM API: {} (attempted model: {})",
                status.as_u16(),
                self.model_name
            );
            warn!("Check https://openrouter.ai/models for the correct model ID and set MODEL_NAME");
            return Err(VlmError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|_| VlmError::InvalidBody(body))
    }
}
