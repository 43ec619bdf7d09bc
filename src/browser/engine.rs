//! Seams between the render pipeline and a concrete browser engine.
//!
//! A [`BrowserEngine`] launches one isolated [`EngineInstance`] per request;
//! the instance opens a single [`PageHandle`] that the renderer drives.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use crate::pdf_options::PrintParams;
use crate::Result;

/// Chromium flags needed inside a restricted serverless sandbox:
/// no setuid sandbox, no GPU, no zygote, a single process and no `/dev/shm`.
pub const SANDBOXLESS_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--no-zygote",
    "--single-process",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Browser binary; `None` lets the engine auto-detect one.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            args: SANDBOXLESS_ARGS.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

impl LaunchOptions {
    pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
        if executable.is_some() {
            self.executable = executable;
        }
        self
    }
}

/// Parameters of the "mostly idle" network heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSettings {
    /// Requests allowed in flight while still counting as idle.
    pub max_inflight: usize,
    /// How long the in-flight count must stay at or below `max_inflight`.
    pub quiet_window: Duration,
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            max_inflight: 2,
            quiet_window: Duration::from_millis(500),
        }
    }
}

#[async_trait]
pub trait BrowserEngine: Send + Sync {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn EngineInstance>>;
}

#[async_trait]
pub trait EngineInstance: Send {
    async fn new_page(&mut self) -> Result<Box<dyn PageHandle>>;

    /// Tears the engine down. Called once per instance.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait PageHandle: Send {
    /// Navigates to `url` and resolves once the network has been idle per `idle`.
    async fn goto_and_wait_idle(&mut self, url: &str, idle: &IdleSettings) -> Result<()>;

    async fn set_content(&mut self, html: &str) -> Result<()>;

    async fn pdf(&mut self, params: &PrintParams) -> Result<Vec<u8>>;
}
