//! pdfgen library
//!
//! Renders HTML strings or URLs to PDF in a headless browser behind a single
//! request handler. Each invocation launches its own browser, renders, and
//! always tears the browser down again.
//!
//! # Module Overview
//!
//! - [`event`] - Inbound platform events and trigger classification (POST / GET / default)
//! - [`request`] - Render requests and render-target resolution
//! - [`pdf_options`] - Baseline PDF options, caller overrides, print parameters
//! - [`browser`] - Engine traits, Chromium engine, per-request render sessions
//! - [`render`] - Drives a page to PDF bytes
//! - [`response`] - Response envelopes
//! - [`dispatcher`] - The handler tying it all together
//! - [`server`] - HTTP adapter over the handler
//! - [`config`] - Configuration file support
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pdfgen_lib::{ChromiumEngine, Dispatcher, InboundEvent, LaunchOptions, RenderSettings};
//!
//! # async fn example() {
//! let dispatcher = Dispatcher::new(
//!     Arc::new(ChromiumEngine),
//!     LaunchOptions::default(),
//!     RenderSettings::default(),
//! );
//! let envelope = dispatcher.handle(&InboundEvent::default()).await;
//! assert_eq!(envelope.status_code, 200);
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod output;
pub mod pdf_options;
pub mod render;
pub mod request;
pub mod response;
pub mod server;

pub use browser::{
    BrowserEngine, ChromiumEngine, IdleSettings, LaunchOptions, RenderSession, StubEngine,
};
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{ErrorCategory, ErrorPayload, PdfGenError, Result};
pub use event::{InboundEvent, RenderTrigger};
pub use output::{ErrorOutput, PdfGenOutput, RenderOutput, PDFGEN_OUTPUT_VERSION};
pub use pdf_options::{PdfOptions, PrintParams};
pub use render::{render_pdf, RenderSettings, DEFAULT_NAVIGATION_TIMEOUT};
pub use request::{RenderRequest, RenderTarget, DEFAULT_FILE_NAME, DEFAULT_HTML};
pub use response::{ResponseBuilder, ResponseEnvelope};
