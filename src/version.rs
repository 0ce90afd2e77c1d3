// Version information for the document field extraction service

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Service name reported in logs
pub const SERVICE_NAME: &str = "doc-field-extractor";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multipart-upload",
    "remote-llm-extraction",
    "local-ocr-extraction",
    "markdown-fence-recovery",
    "regex-field-extraction",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} {}", SERVICE_NAME, VERSION_NUMBER)
}
