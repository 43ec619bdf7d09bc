use std::process::ExitCode;

use pdfgen_lib::{ErrorOutput, PdfGenError, PdfGenOutput, PDFGEN_OUTPUT_VERSION};
use serde::Serialize;

/// Exit code for fatal errors and 5xx envelopes.
pub const EXIT_FAILURE: u8 = 2;

/// Print a JSON payload on stdout.
pub fn write_json<T: Serialize>(body: &T) -> Result<(), serde_json::Error> {
    let content = serde_json::to_string(body)?;
    println!("{content}");
    Ok(())
}

/// Render an error as JSON on stdout and return the failure exit code.
pub fn render_error(err: PdfGenError) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = PdfGenOutput::Error(ErrorOutput {
        version: PDFGEN_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    let content =
        serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
    println!("{content}");

    ExitCode::from(EXIT_FAILURE)
}

/// Envelopes below 500 count as success for the process exit code.
pub fn exit_code_for_status(status_code: u16) -> ExitCode {
    if status_code < 500 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_and_echoes_exit_zero() {
        assert_eq!(exit_code_for_status(200), ExitCode::SUCCESS);
        assert_eq!(exit_code_for_status(400), ExitCode::SUCCESS);
    }

    #[test]
    fn server_errors_exit_two() {
        assert_eq!(exit_code_for_status(500), ExitCode::from(EXIT_FAILURE));
    }
}
