use crate::error::ErrorPayload;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Schema version for CLI output payloads.
pub const PDFGEN_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PdfGenOutput {
    Render(RenderOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub version: String,
    /// `"html"` or `"url"`.
    pub target: String,
    pub output_path: PathBuf,
    pub bytes: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn render_output_serializes_with_mode_tag() {
        let output = PdfGenOutput::Render(RenderOutput {
            version: PDFGEN_OUTPUT_VERSION.to_string(),
            target: "html".to_string(),
            output_path: PathBuf::from("out.pdf"),
            bytes: 1024,
            elapsed_ms: 12,
        });
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["mode"], "render");
        assert_eq!(value["outputPath"], "out.pdf");
        assert_eq!(value["elapsedMs"], 12);
    }

    #[test]
    fn error_output_round_trips() {
        let output = PdfGenOutput::Error(ErrorOutput {
            version: PDFGEN_OUTPUT_VERSION.to_string(),
            message: Some("boom".to_string()),
            error: ErrorPayload::new(ErrorCategory::Render, "boom".to_string(), "retry"),
        });
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"mode\":\"error\""));
        match serde_json::from_str::<PdfGenOutput>(&json).unwrap() {
            PdfGenOutput::Error(err) => assert_eq!(err.error.category, ErrorCategory::Render),
            other => panic!("expected error output, got {other:?}"),
        }
    }
}
