use std::io::Read;
use std::process::ExitCode;

use pdfgen_lib::{InboundEvent, PdfGenError};
use serde_json::Value;
use tracing::debug;

use crate::formatting::{exit_code_for_status, render_error, write_json};
use crate::settings::ResolvedSettings;

/// Run the invoke command: one event in, one envelope out on stdout.
pub async fn run_invoke(settings: &ResolvedSettings, event_source: &str) -> ExitCode {
    let raw = match read_event(event_source) {
        Ok(raw) => raw,
        Err(err) => return render_error(err),
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            return render_error(PdfGenError::InvalidEvent(format!(
                "Event is not valid JSON: {err}"
            )))
        }
    };
    let event = InboundEvent::from_value_lenient(value);
    debug!(method = event.method().unwrap_or("-"), "invoking handler");

    let envelope = settings.dispatcher().handle(&event).await;
    if let Err(err) = write_json(&envelope) {
        return render_error(PdfGenError::Serialization(err));
    }
    exit_code_for_status(envelope.status_code)
}

fn read_event(source: &str) -> Result<String, PdfGenError> {
    if source == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(source).map_err(|e| {
            PdfGenError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read event file {source}: {e}"),
            ))
        })
    }
}
