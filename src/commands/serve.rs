use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use pdfgen_lib::server::serve;
use pdfgen_lib::PdfGenError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::formatting::render_error;
use crate::settings::ResolvedSettings;

/// Run the serve command until Ctrl-C.
pub async fn run_serve(settings: &ResolvedSettings, bind: SocketAddr) -> ExitCode {
    let listener = match TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(err) => {
            return render_error(PdfGenError::Config(format!(
                "Failed to bind {bind}: {err}"
            )))
        }
    };

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown requested"),
            Err(err) => warn!(error = %err, "failed to listen for ctrl-c; shutting down"),
        }
        trigger.cancel();
    });

    match serve(listener, Arc::new(settings.dispatcher()), shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_error(err),
    }
}
