// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ServiceConfig, StrategyKind};

/// Document field extraction service
#[derive(Parser, Debug, Default)]
#[command(name = "doc-field-extractor")]
#[command(version)]
#[command(about = "HTTP service extracting structured fields from document images", long_about = None)]
pub struct Cli {
    /// Listen address (overrides BIND_ADDR)
    #[arg(long)]
    pub bind: Option<String>,

    /// Extraction strategy (overrides EXTRACTION_STRATEGY)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyKind>,

    /// Tesseract binary (overrides TESSERACT_CMD)
    #[arg(long)]
    pub tesseract_path: Option<PathBuf>,

    /// Tesseract language-data directory (overrides TESSDATA_PREFIX)
    #[arg(long)]
    pub tessdata_dir: Option<PathBuf>,
}

impl Cli {
    /// Load the environment configuration and apply command-line overrides
    pub fn into_config(self) -> Result<ServiceConfig, ConfigError> {
        let config = ServiceConfig::from_env()?;
        Ok(self.apply(config))
    }

    pub fn apply(self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(path) = self.tesseract_path {
            config.ocr.tesseract_path = Some(path);
        }
        if let Some(dir) = self.tessdata_dir {
            config.ocr.tessdata_dir = Some(dir);
        }
        config
    }
}
