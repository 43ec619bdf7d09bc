use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::browser::{IdleSettings, PageHandle};
use crate::pdf_options::PdfOptions;
use crate::request::RenderTarget;
use crate::{PdfGenError, Result};

/// Default bound on navigation plus the network-idle wait.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub navigation_timeout: Duration,
    pub idle: IdleSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            idle: IdleSettings::default(),
        }
    }
}

/// Loads `target` into `page` and exports it as PDF bytes.
///
/// Engine errors propagate as-is; nothing is retried.
pub async fn render_pdf(
    page: &mut dyn PageHandle,
    target: &RenderTarget,
    options: &PdfOptions,
    settings: &RenderSettings,
) -> Result<Vec<u8>> {
    let params = options.to_print_params()?;

    match target {
        RenderTarget::Url(url) => {
            debug!(url = %url, "navigating");
            timeout(
                settings.navigation_timeout,
                page.goto_and_wait_idle(url, &settings.idle),
            )
            .await
            .map_err(|_| {
                PdfGenError::Timeout(format!(
                    "Navigation timeout of {} ms exceeded",
                    settings.navigation_timeout.as_millis()
                ))
            })??;
        }
        RenderTarget::Html(html) => {
            debug!(bytes = html.len(), "setting page content");
            page.set_content(html).await?;
        }
    }

    let pdf = page.pdf(&params).await?;
    debug!(bytes = pdf.len(), "pdf exported");
    Ok(pdf)
}
