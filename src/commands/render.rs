use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use pdfgen_lib::{
    PdfGenError, PdfGenOutput, RenderOutput, RenderRequest, PDFGEN_OUTPUT_VERSION,
};
use serde_json::Value;
use tracing::info;

use crate::formatting::{render_error, write_json};
use crate::settings::ResolvedSettings;

/// Run the render command: render one document straight to `output`.
pub async fn run_render(
    settings: &ResolvedSettings,
    html: Option<String>,
    url: Option<String>,
    pdf_config: Option<String>,
    output: PathBuf,
) -> ExitCode {
    let mut request = match (html, url) {
        (Some(html), _) => RenderRequest::html(html),
        (None, Some(url)) => RenderRequest::url(url),
        (None, None) => {
            return render_error(PdfGenError::Config(
                "Provide --html or --url".to_string(),
            ))
        }
    };
    if let Some(raw) = pdf_config {
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => request.pdf_options = map,
            Ok(_) => {
                return render_error(PdfGenError::Config(
                    "--pdf-config must be a JSON object".to_string(),
                ))
            }
            Err(err) => {
                return render_error(PdfGenError::Config(format!(
                    "Invalid --pdf-config JSON: {err}"
                )))
            }
        }
    }
    let target = request
        .target
        .as_ref()
        .map(|t| t.kind())
        .unwrap_or("html")
        .to_string();

    let start = Instant::now();
    let pdf = match settings.dispatcher().render_document(&request).await {
        Ok(pdf) => pdf,
        Err(err) => return render_error(err),
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            return render_error(PdfGenError::Io(err));
        }
    }
    if let Err(err) = std::fs::write(&output, &pdf) {
        return render_error(PdfGenError::Io(err));
    }
    info!(path = %output.display(), bytes = pdf.len(), "wrote pdf");

    let body = PdfGenOutput::Render(RenderOutput {
        version: PDFGEN_OUTPUT_VERSION.to_string(),
        target,
        output_path: output,
        bytes: pdf.len(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    });
    if let Err(err) = write_json(&body) {
        return render_error(PdfGenError::Serialization(err));
    }
    ExitCode::SUCCESS
}
