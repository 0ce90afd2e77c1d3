// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide service configuration
//!
//! Read once at startup from the environment (and `.env`), then shared
//! read-only with every request through the axum state.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default OpenAI-compatible chat completions endpoint
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default vision model on OpenRouter
pub const DEFAULT_MODEL_NAME: &str = "nvidia/nemotron-nano-12b-v2-vl:free";

/// Listen on all interfaces, port 5001
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";

/// Fixed timeout for the remote LLM call
pub const LLM_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for one Tesseract invocation
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 60;

/// Default Tesseract language
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}

/// Which extraction strategy the service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyKind {
    /// Remote vision-language model over HTTP
    Llm,
    /// Local Tesseract OCR plus regex field extraction
    LocalOcr,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Llm => "llm",
            StrategyKind::LocalOcr => "local-ocr",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "llm" | "remote-llm" => Ok(StrategyKind::Llm),
            "local-ocr" | "local_ocr" | "ocr" | "tesseract" => Ok(StrategyKind::LocalOcr),
            other => Err(format!("unknown strategy '{}', expected 'llm' or 'local-ocr'", other)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remote LLM settings
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer token, `None` when neither key variable is set
    pub api_key: Option<String>,
    pub api_url: String,
    pub model_name: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            timeout: LLM_REQUEST_TIMEOUT,
            max_tokens: 1000,
            temperature: 0.1,
        }
    }
}

// The key never reaches the logs.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model_name", &self.model_name)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Local OCR engine settings
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Explicit Tesseract binary, skips discovery when set
    pub tesseract_path: Option<PathBuf>,
    /// Explicit language-data directory
    pub tessdata_dir: Option<PathBuf>,
    pub language: String,
    pub timeout: Duration,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_OCR_TIMEOUT_SECS),
        }
    }
}

/// Immutable service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub strategy: StrategyKind,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            strategy: StrategyKind::Llm,
            llm: LlmConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let strategy = match get("EXTRACTION_STRATEGY") {
            Some(value) => value
                .parse::<StrategyKind>()
                .map_err(|reason| ConfigError::InvalidValue {
                    var: "EXTRACTION_STRATEGY".to_string(),
                    value,
                    reason,
                })?,
            None => StrategyKind::Llm,
        };

        let ocr_timeout_secs = match get("OCR_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "OCR_TIMEOUT_SECS".to_string(),
                        value,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
            None => DEFAULT_OCR_TIMEOUT_SECS,
        };

        let llm = LlmConfig {
            api_key: get("OPENROUTER_API_KEY").or_else(|| get("NEMOTRON_API_KEY")),
            api_url: get("OPENROUTER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model_name: get("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            ..LlmConfig::default()
        };

        let ocr = OcrConfig {
            tesseract_path: get("TESSERACT_CMD").map(PathBuf::from),
            tessdata_dir: get("TESSDATA_PREFIX").map(PathBuf::from),
            language: get("OCR_LANGUAGE").unwrap_or_else(|| DEFAULT_OCR_LANGUAGE.to_string()),
            timeout: Duration::from_secs(ocr_timeout_secs),
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            strategy,
            llm,
            ocr,
        })
    }
}
