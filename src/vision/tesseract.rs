// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tesseract OCR engine
//!
//! The engine binary and its language data are located once at startup by
//! [`resolve_ocr_engine`]. A missing engine does not stop the service; every
//! recognition call fails with [`OcrError::EngineUnavailable`] instead.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::OcrConfig;

/// Errors from the OCR engine
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("OCR timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one recognition pass
#[derive(Debug, Clone)]
pub struct OcrOutput {
    /// Recognized text, layout not preserved
    pub text: String,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Outcome of engine discovery
#[derive(Debug, Clone, PartialEq)]
pub enum EngineHandle {
    Located {
        binary: PathBuf,
        tessdata_dir: Option<PathBuf>,
    },
    Unavailable {
        reason: String,
    },
}

/// Locate the Tesseract binary and its language-data directory
///
/// Probes the explicitly configured path first, then `PATH`, then the
/// well-known install locations for the current OS. An explicitly configured
/// binary that does not exist is reported as unavailable rather than
/// silently replaced.
pub fn resolve_ocr_engine(config: &OcrConfig) -> EngineHandle {
    let binary = match &config.tesseract_path {
        Some(path) if path.is_file() => path.clone(),
        Some(path) => {
            return EngineHandle::Unavailable {
                reason: format!("configured tesseract binary {} does not exist", path.display()),
            }
        }
        None => match which::which("tesseract")
            .ok()
            .or_else(|| candidate_binaries().into_iter().find(|p| p.is_file()))
        {
            Some(path) => path,
            None => {
                return EngineHandle::Unavailable {
                    reason: "tesseract not found (install tesseract-ocr or set TESSERACT_CMD)"
                        .to_string(),
                }
            }
        },
    };

    let tessdata_dir = resolve_tessdata_dir(&binary, config.tessdata_dir.as_deref());

    EngineHandle::Located {
        binary,
        tessdata_dir,
    }
}

/// Well-known install locations per platform
fn candidate_binaries() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        vec![
            PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe"),
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/bin/tesseract"),
            PathBuf::from("/usr/local/bin/tesseract"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/bin/tesseract"),
            PathBuf::from("/usr/local/bin/tesseract"),
        ]
    }
}

fn resolve_tessdata_dir(binary: &Path, configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = configured {
        if !dir.is_dir() {
            warn!("Configured tessdata directory {} does not exist", dir.display());
        }
        return Some(dir.to_path_buf());
    }

    // Windows installer layout: tessdata next to tesseract.exe
    if let Some(sibling) = binary.parent().map(|p| p.join("tessdata")) {
        if sibling.is_dir() {
            return Some(sibling);
        }
    }

    if cfg!(target_os = "macos") {
        return ["/opt/homebrew/share/tessdata", "/usr/local/share/tessdata"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_dir());
    }

    // Let tesseract use its compiled-in default
    None
}

/// Tesseract invoked as a child process, one process per image
pub struct TesseractEngine {
    handle: EngineHandle,
    language: String,
    timeout: Duration,
}

impl TesseractEngine {
    /// Resolve the engine once from configuration
    pub fn resolve(config: &OcrConfig) -> Self {
        let handle = resolve_ocr_engine(config);
        match &handle {
            EngineHandle::Located {
                binary,
                tessdata_dir,
            } => info!(
                "Tesseract located: binary={}, tessdata={}",
                binary.display(),
                tessdata_dir
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_else(|| "default".to_string())
            ),
            EngineHandle::Unavailable { reason } => {
                warn!("Tesseract unavailable, OCR requests will fail: {}", reason)
            }
        }
        Self::with_handle(handle, &config.language, config.timeout)
    }

    pub fn with_handle(handle: EngineHandle, language: &str, timeout: Duration) -> Self {
        Self {
            handle,
            language: language.to_string(),
            timeout,
        }
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    pub fn is_available(&self) -> bool {
        matches!(self.handle, EngineHandle::Located { .. })
    }

    pub fn availability_hint(&self) -> String {
        match &self.handle {
            EngineHandle::Located { .. } => "Tesseract is available".to_string(),
            EngineHandle::Unavailable { reason } => reason.clone(),
        }
    }

    /// Run Tesseract over PNG-encoded image bytes
    pub async fn recognize(&self, png: Vec<u8>) -> Result<OcrOutput, OcrError> {
        let (binary, tessdata_dir) = match &self.handle {
            EngineHandle::Located {
                binary,
                tessdata_dir,
            } => (binary, tessdata_dir),
            EngineHandle::Unavailable { reason } => {
                return Err(OcrError::EngineUnavailable(reason.clone()))
            }
        };

        let start = Instant::now();

        let mut command = Command::new(binary);
        command
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language);
        if let Some(dir) = tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OcrError::EngineUnavailable(format!(
                "tesseract binary {} could not be started",
                binary.display()
            )),
            _ => OcrError::Io(e),
        })?;

        // Feed stdin from its own task so a chatty child cannot block on a full pipe
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::OcrFailed("tesseract stdin unavailable".to_string()))?;
        let writer = tokio::spawn(async move {
            stdin.write_all(&png).await?;
            stdin.shutdown().await
        });

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                writer.abort();
                return Err(OcrError::Timeout(self.timeout));
            }
        };

        if let Ok(Err(e)) = writer.await {
            // A child that exits early closes the pipe; its exit status says more
            debug!("tesseract stdin write ended early: {}", e);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::OcrFailed(format!(
                "tesseract failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(OcrOutput {
            text: String::from_utf8_lossy(&output.stdout).to_string(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
