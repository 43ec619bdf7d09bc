use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfGenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidEvent(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("{0}")]
    Navigation(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl PdfGenError {
    pub fn render(message: impl Into<String>) -> Self {
        PdfGenError::Render(message.into())
    }

    pub fn navigation(message: impl Into<String>) -> Self {
        PdfGenError::Navigation(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            PdfGenError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            PdfGenError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Check that the request body or `pdf` query parameter is valid JSON.",
            ),
            PdfGenError::InvalidEvent(msg) => ErrorPayload::new(
                ErrorCategory::Input,
                msg.to_string(),
                "Check the event shape and percent-encoding of the `pdf` query parameter.",
            ),
            PdfGenError::Launch(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("could not auto detect") || lower.contains("executable") {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        msg.to_string(),
                        "Install Chromium or point --executable / PDFGEN_EXECUTABLE_PATH at a Chrome binary.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        msg.to_string(),
                        "Re-run with --verbose to see the browser's startup output.",
                    )
                }
            }
            PdfGenError::Navigation(msg) => ErrorPayload::new(
                ErrorCategory::Browser,
                msg.to_string(),
                "Verify the URL is reachable from this host (e.g., https://example.com).",
            ),
            PdfGenError::Timeout(msg) => ErrorPayload::new(
                ErrorCategory::Browser,
                msg.to_string(),
                "Increase timeouts.navigation in the config or ensure the page stops loading.",
            ),
            PdfGenError::Render(msg) => ErrorPayload::new(
                ErrorCategory::Render,
                msg.to_string(),
                "Check pdfConfig values (format, margin units, scale).",
            ),
            PdfGenError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Check the config file and flags (e.g., --config pdfgen.toml).",
            ),
            PdfGenError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, PdfGenError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Input,
    Browser,
    Render,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
