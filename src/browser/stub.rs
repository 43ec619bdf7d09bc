//! In-process engine that never starts a browser.
//!
//! Produces a small deterministic PDF and records every call, so the request
//! pipeline can be exercised (and dry-run from the CLI) without Chromium.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::engine::{BrowserEngine, EngineInstance, IdleSettings, LaunchOptions, PageHandle};
use crate::pdf_options::PrintParams;
use crate::{PdfGenError, Result};

const POINTS_PER_INCH: f64 = 72.0;

/// Snapshot of what the stub has been asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StubLog {
    pub launches: usize,
    pub closes: usize,
    pub pages: usize,
    pub launch_options: Vec<LaunchOptions>,
    pub navigations: Vec<String>,
    pub contents: Vec<String>,
    pub prints: Vec<PrintParams>,
}

#[derive(Debug, Clone, Default)]
struct Failures {
    launch: Option<String>,
    new_page: Option<String>,
    navigation: Option<String>,
    content: Option<String>,
    pdf: Option<String>,
    stall_navigation: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StubEngine {
    log: Arc<Mutex<StubLog>>,
    failures: Failures,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_launch(mut self, message: impl Into<String>) -> Self {
        self.failures.launch = Some(message.into());
        self
    }

    pub fn failing_new_page(mut self, message: impl Into<String>) -> Self {
        self.failures.new_page = Some(message.into());
        self
    }

    pub fn failing_navigation(mut self, message: impl Into<String>) -> Self {
        self.failures.navigation = Some(message.into());
        self
    }

    pub fn failing_content(mut self, message: impl Into<String>) -> Self {
        self.failures.content = Some(message.into());
        self
    }

    pub fn failing_pdf(mut self, message: impl Into<String>) -> Self {
        self.failures.pdf = Some(message.into());
        self
    }

    /// Navigation never reaches network idle.
    pub fn stalling_navigation(mut self) -> Self {
        self.failures.stall_navigation = true;
        self
    }

    pub fn log(&self) -> StubLog {
        lock(&self.log).clone()
    }
}

fn lock(log: &Mutex<StubLog>) -> MutexGuard<'_, StubLog> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl BrowserEngine for StubEngine {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn EngineInstance>> {
        if let Some(message) = &self.failures.launch {
            return Err(PdfGenError::Launch(message.clone()));
        }
        {
            let mut log = lock(&self.log);
            log.launches += 1;
            log.launch_options.push(options.clone());
        }
        Ok(Box::new(StubInstance {
            log: Arc::clone(&self.log),
            failures: self.failures.clone(),
        }))
    }
}

struct StubInstance {
    log: Arc<Mutex<StubLog>>,
    failures: Failures,
}

#[async_trait]
impl EngineInstance for StubInstance {
    async fn new_page(&mut self) -> Result<Box<dyn PageHandle>> {
        if let Some(message) = &self.failures.new_page {
            return Err(PdfGenError::Render(message.clone()));
        }
        lock(&self.log).pages += 1;
        Ok(Box::new(StubPage {
            log: Arc::clone(&self.log),
            failures: self.failures.clone(),
        }))
    }

    async fn close(&mut self) -> Result<()> {
        lock(&self.log).closes += 1;
        Ok(())
    }
}

struct StubPage {
    log: Arc<Mutex<StubLog>>,
    failures: Failures,
}

#[async_trait]
impl PageHandle for StubPage {
    async fn goto_and_wait_idle(&mut self, url: &str, _idle: &IdleSettings) -> Result<()> {
        lock(&self.log).navigations.push(url.to_string());
        if self.failures.stall_navigation {
            std::future::pending::<()>().await;
        }
        match &self.failures.navigation {
            Some(message) => Err(PdfGenError::Navigation(message.clone())),
            None => Ok(()),
        }
    }

    async fn set_content(&mut self, html: &str) -> Result<()> {
        lock(&self.log).contents.push(html.to_string());
        match &self.failures.content {
            Some(message) => Err(PdfGenError::Render(message.clone())),
            None => Ok(()),
        }
    }

    async fn pdf(&mut self, params: &PrintParams) -> Result<Vec<u8>> {
        lock(&self.log).prints.push(params.clone());
        if let Some(message) = &self.failures.pdf {
            return Err(PdfGenError::Render(message.clone()));
        }
        Ok(stub_pdf(params))
    }
}

/// A one-page, empty PDF sized to `params`.
pub fn stub_pdf(params: &PrintParams) -> Vec<u8> {
    let (width, height) = if params.landscape {
        (params.paper_height, params.paper_width)
    } else {
        (params.paper_width, params.paper_height)
    };
    format!(
        "%PDF-1.4\n\
         1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
         2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n\
         3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] >> endobj\n\
         trailer << /Root 1 0 R >>\n\
         %%EOF\n",
        width * POINTS_PER_INCH,
        height * POINTS_PER_INCH
    )
    .into_bytes()
}
