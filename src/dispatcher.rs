//! Entry point: one inbound event in, exactly one response envelope out.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, info_span, Instrument};

use crate::browser::{BrowserEngine, LaunchOptions, RenderSession};
use crate::event::{InboundEvent, RenderTrigger};
use crate::render::{render_pdf, RenderSettings};
use crate::request::{RenderRequest, RenderTarget, DEFAULT_HTML, GET_KEYS, POST_KEYS};
use crate::response::{ResponseBuilder, ResponseEnvelope};
use crate::{PdfGenError, Result};

/// Runs render requests, each in its own freshly launched browser session.
#[derive(Clone)]
pub struct Dispatcher {
    engine: Arc<dyn BrowserEngine>,
    launch: LaunchOptions,
    settings: RenderSettings,
    sessions: Arc<Semaphore>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("launch", &self.launch)
            .field("settings", &self.settings)
            .field("available_sessions", &self.sessions.available_permits())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        engine: Arc<dyn BrowserEngine>,
        launch: LaunchOptions,
        settings: RenderSettings,
    ) -> Self {
        Self {
            engine,
            launch,
            settings,
            sessions: Arc::new(Semaphore::new(1)),
        }
    }

    /// Caps how many browser sessions may be alive at once (minimum 1).
    pub fn with_max_concurrent_sessions(mut self, max: usize) -> Self {
        self.sessions = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    /// Handles one platform event. Never fails: errors become a 500 envelope.
    pub async fn handle(&self, event: &InboundEvent) -> ResponseEnvelope {
        let span = info_span!("request", method = event.method().unwrap_or("-"));
        async {
            let start = Instant::now();
            let envelope = match self.handle_inner(event).await {
                Ok(envelope) => envelope,
                Err(err) => {
                    error!(error = %err, "render request failed");
                    ResponseBuilder::error(&err.to_string())
                }
            };
            info!(
                status = envelope.status_code,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "request finished"
            );
            envelope
        }
        .instrument(span)
        .await
    }

    /// Renders a request outside the event flow, e.g. straight to a file.
    pub async fn render_document(&self, request: &RenderRequest) -> Result<Vec<u8>> {
        let target = request.target.as_ref().ok_or_else(|| {
            PdfGenError::InvalidEvent(
                "Nothing to render: provide HTML content or a URL".to_string(),
            )
        })?;
        let _permit = self.permit().await?;
        let mut session = RenderSession::acquire(self.engine.as_ref(), &self.launch).await?;
        let outcome = self.render(&mut session, target, request).await;
        session.release().await;
        outcome
    }

    async fn handle_inner(&self, event: &InboundEvent) -> Result<ResponseEnvelope> {
        let _permit = self.permit().await?;
        let mut session = RenderSession::acquire(self.engine.as_ref(), &self.launch).await?;
        let outcome = self.respond(&mut session, event).await;
        session.release().await;
        outcome
    }

    async fn respond(
        &self,
        session: &mut RenderSession,
        event: &InboundEvent,
    ) -> Result<ResponseEnvelope> {
        let trigger = RenderTrigger::classify(event)?;
        debug!(trigger = trigger.name(), "classified event");

        match trigger {
            RenderTrigger::Post { body } => {
                let request = RenderRequest::resolve(&body, &POST_KEYS);
                match &request.target {
                    Some(target) => self.render_response(session, target, &request).await,
                    None => {
                        debug!("post body has nothing to render; echoing it");
                        Ok(ResponseBuilder::echo(&body))
                    }
                }
            }
            RenderTrigger::Get { payload } => {
                let request = RenderRequest::resolve(&payload, &GET_KEYS);
                match &request.target {
                    Some(target) => self.render_response(session, target, &request).await,
                    None => Ok(ResponseBuilder::invalid_parameters()),
                }
            }
            RenderTrigger::Default => {
                let request = RenderRequest::default_document();
                let target = RenderTarget::Html(DEFAULT_HTML.to_string());
                self.render_response(session, &target, &request).await
            }
        }
    }

    async fn render_response(
        &self,
        session: &mut RenderSession,
        target: &RenderTarget,
        request: &RenderRequest,
    ) -> Result<ResponseEnvelope> {
        let pdf = self.render(session, target, request).await?;
        Ok(ResponseBuilder::pdf(&pdf, request.file_name.as_deref()))
    }

    async fn render(
        &self,
        session: &mut RenderSession,
        target: &RenderTarget,
        request: &RenderRequest,
    ) -> Result<Vec<u8>> {
        debug!(target = target.kind(), "rendering");
        render_pdf(session.page()?, target, &request.options(), &self.settings).await
    }

    async fn permit(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        self.sessions
            .acquire()
            .await
            .map_err(|_| PdfGenError::Unknown("Dispatcher is shutting down".to_string()))
    }
}
