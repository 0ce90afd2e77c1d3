// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod version;
pub mod vision;

// Re-export main types
pub use config::{ServiceConfig, StrategyKind};
pub use extraction::{build_extractor, ExtractionError, ExtractionResult, FieldExtractor};
