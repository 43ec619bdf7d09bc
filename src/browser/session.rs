//! Per-request ownership of one engine instance and one page.

use tracing::{debug, warn};

use super::engine::{BrowserEngine, EngineInstance, LaunchOptions, PageHandle};
use crate::{PdfGenError, Result};

/// One browser instance plus one page, owned by a single request.
///
/// Callers finish with [`RenderSession::release`]. A session dropped before that
/// (e.g. a cancelled request future) closes its instance on a spawned task.
pub struct RenderSession {
    instance: Option<Box<dyn EngineInstance>>,
    page: Option<Box<dyn PageHandle>>,
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("released", &self.is_released())
            .finish()
    }
}

impl RenderSession {
    /// Launches a fresh engine instance and opens one page in it.
    ///
    /// If the page cannot be opened the instance is closed before the error is returned.
    pub async fn acquire(engine: &dyn BrowserEngine, options: &LaunchOptions) -> Result<Self> {
        debug!(executable = ?options.executable, headless = options.headless, "launching browser");
        let mut instance = engine.launch(options).await?;
        match instance.new_page().await {
            Ok(page) => Ok(Self {
                instance: Some(instance),
                page: Some(page),
            }),
            Err(err) => {
                if let Err(close_err) = instance.close().await {
                    warn!(error = %close_err, "failed to close browser after page creation error");
                }
                Err(err)
            }
        }
    }

    pub fn page(&mut self) -> Result<&mut dyn PageHandle> {
        match self.page.as_deref_mut() {
            Some(page) => Ok(page),
            None => Err(PdfGenError::Unknown(
                "render session already released".to_string(),
            )),
        }
    }

    pub fn is_released(&self) -> bool {
        self.instance.is_none()
    }

    /// Tears down the engine instance. Later calls are no-ops.
    pub async fn release(&mut self) {
        self.page.take();
        if let Some(mut instance) = self.instance.take() {
            match instance.close().await {
                Ok(()) => debug!("browser closed"),
                Err(err) => warn!(error = %err, "browser close failed"),
            }
        }
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        let Some(mut instance) = self.instance.take() else {
            return;
        };
        self.page.take();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!("render session dropped without release; closing browser in background");
                runtime.spawn(async move {
                    if let Err(err) = instance.close().await {
                        warn!(error = %err, "background browser close failed");
                    }
                });
            }
            Err(_) => warn!("render session dropped outside a runtime; browser not closed"),
        }
    }
}
