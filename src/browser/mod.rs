//! Browser engine abstraction and per-request render sessions.
//!
//! # Module Structure
//!
//! - [`engine`] - Engine/instance/page traits and launch options
//! - [`session`] - `RenderSession`: one instance and one page per request, released exactly once
//! - [`idle`] - Network-idle tracking used while waiting for navigations
//! - [`chromium`] - Headless Chromium over the DevTools protocol
//! - [`stub`] - Browserless engine for tests and dry runs
//!
//! # Example
//!
//! ```no_run
//! use pdfgen_lib::browser::{ChromiumEngine, LaunchOptions, RenderSession};
//!
//! # async fn example() -> pdfgen_lib::Result<()> {
//! let mut session = RenderSession::acquire(&ChromiumEngine, &LaunchOptions::default()).await?;
//! session.page()?.set_content("<h1>Hi</h1>").await?;
//! session.release().await;
//! # Ok(())
//! # }
//! ```

mod chromium;
mod engine;
mod idle;
mod session;
mod stub;

pub use chromium::ChromiumEngine;
pub use engine::{
    BrowserEngine, EngineInstance, IdleSettings, LaunchOptions, PageHandle, SANDBOXLESS_ARGS,
};
pub use idle::{IdleTracker, NetworkEvent};
pub use session::RenderSession;
pub use stub::{stub_pdf, StubEngine, StubLog};
