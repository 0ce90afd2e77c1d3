// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use doc_field_extractor::{
    api::{start_server, AppState},
    cli::Cli,
    config::StrategyKind,
    extraction::build_extractor,
    version,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = Cli::parse().into_config()?;

    tracing::info!("Starting {}", version::get_version_string());
    tracing::debug!("Features: {}", version::FEATURES.join(", "));
    tracing::info!(
        "Strategy: {}, bind address: {}",
        config.strategy,
        config.bind_addr
    );
    match config.strategy {
        StrategyKind::Llm => {
            tracing::info!(
                "Model: {} via {}",
                config.llm.model_name,
                config.llm.api_url
            );
            if config.llm.api_key.is_none() {
                tracing::warn!(
                    "No API key configured (OPENROUTER_API_KEY / NEMOTRON_API_KEY); /ocr will fail until one is set"
                );
            }
        }
        StrategyKind::LocalOcr => {
            tracing::info!(
                "OCR language: {}, timeout: {:?}",
                config.ocr.language,
                config.ocr.timeout
            );
        }
    }

    let extractor = build_extractor(&config)?;
    let state = AppState::new(config, extractor);

    start_server(state).await
}
