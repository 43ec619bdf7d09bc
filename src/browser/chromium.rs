//! Chromium engine driven over the DevTools protocol with chromiumoxide.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use futures::{stream, StreamExt};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::engine::{BrowserEngine, EngineInstance, IdleSettings, LaunchOptions, PageHandle};
use super::idle::{IdleTracker, NetworkEvent};
use crate::pdf_options::PrintParams;
use crate::{PdfGenError, Result};

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumEngine;

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn EngineInstance>> {
        let mut builder = BrowserConfig::builder().args(options.args.iter().cloned());
        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(PdfGenError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PdfGenError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    trace!(error = %err, "devtools handler event error");
                }
            }
            debug!("devtools connection closed");
        });

        Ok(Box::new(ChromiumInstance {
            browser,
            handler_task,
        }))
    }
}

struct ChromiumInstance {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl EngineInstance for ChromiumInstance {
    async fn new_page(&mut self) -> Result<Box<dyn PageHandle>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| PdfGenError::Launch(e.to_string()))?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(err) = self.browser.wait().await {
            debug!(error = %err, "failed to reap browser process");
        }
        self.handler_task.abort();
        closed
            .map(|_| ())
            .map_err(|e| PdfGenError::Unknown(format!("Failed to close browser: {e}")))
    }
}

struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn goto_and_wait_idle(&mut self, url: &str, idle: &IdleSettings) -> Result<()> {
        let started = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| PdfGenError::navigation(e.to_string()))?
            .map(|ev| NetworkEvent::Started(ev.request_id.inner().clone()));
        let finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(|e| PdfGenError::navigation(e.to_string()))?
            .map(|ev| NetworkEvent::Finished(ev.request_id.inner().clone()));
        let failed = self
            .page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(|e| PdfGenError::navigation(e.to_string()))?
            .map(|ev| NetworkEvent::Failed(ev.request_id.inner().clone()));
        let mut events = std::pin::pin!(stream::select(started, stream::select(finished, failed)));

        let mut navigation = std::pin::pin!(self.page.goto(url));
        let mut committed = false;
        let mut tracker = IdleTracker::new(idle, Instant::now());
        let mut poll = tokio::time::interval(IDLE_POLL_INTERVAL);

        loop {
            tokio::select! {
                result = &mut navigation, if !committed => {
                    result.map_err(|e| PdfGenError::navigation(e.to_string()))?;
                    committed = true;
                    tracker.restart(Instant::now());
                    debug!(url, inflight = tracker.inflight(), "navigation committed");
                }
                Some(event) = events.next() => tracker.observe(event, Instant::now()),
                _ = poll.tick() => {
                    if committed && tracker.is_idle(Instant::now()) {
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn set_content(&mut self, html: &str) -> Result<()> {
        self.page
            .set_content(html)
            .await
            .map(|_| ())
            .map_err(|e| PdfGenError::render(e.to_string()))
    }

    async fn pdf(&mut self, params: &PrintParams) -> Result<Vec<u8>> {
        self.page
            .pdf(to_cdp_params(params))
            .await
            .map_err(|e| PdfGenError::render(e.to_string()))
    }
}

fn to_cdp_params(params: &PrintParams) -> PrintToPdfParams {
    PrintToPdfParams {
        landscape: Some(params.landscape),
        display_header_footer: Some(params.display_header_footer),
        print_background: Some(params.print_background),
        scale: Some(params.scale),
        paper_width: Some(params.paper_width),
        paper_height: Some(params.paper_height),
        margin_top: Some(params.margin.top),
        margin_bottom: Some(params.margin.bottom),
        margin_left: Some(params.margin.left),
        margin_right: Some(params.margin.right),
        page_ranges: params.page_ranges.clone(),
        header_template: params.header_template.clone(),
        footer_template: params.footer_template.clone(),
        prefer_css_page_size: Some(params.prefer_css_page_size),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf_options::PdfOptions;
    use serde_json::json;

    #[test]
    fn cdp_params_carry_paper_and_margins() {
        let overrides = json!({"margin": {"top": "1in", "left": "48px"}, "pageRanges": "1"});
        let options = PdfOptions::merged(overrides.as_object().unwrap());
        let cdp = to_cdp_params(&options.to_print_params().unwrap());

        assert_eq!(cdp.paper_width, Some(8.27));
        assert_eq!(cdp.paper_height, Some(11.7));
        assert_eq!(cdp.margin_top, Some(1.0));
        assert_eq!(cdp.margin_left, Some(0.5));
        assert_eq!(cdp.margin_bottom, Some(0.0));
        assert_eq!(cdp.print_background, Some(true));
        assert_eq!(cdp.page_ranges.as_deref(), Some("1"));
        assert!(cdp.header_template.is_none());
    }

    #[tokio::test]
    async fn launch_with_missing_executable_fails() {
        let options = LaunchOptions::default()
            .with_executable(Some("/definitely/not/a/chrome".into()));
        let result = ChromiumEngine.launch(&options).await;
        assert!(matches!(result, Err(PdfGenError::Launch(_))));
    }
}
