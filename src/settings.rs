use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pdfgen_lib::{
    BrowserEngine, ChromiumEngine, Config, Dispatcher, LaunchOptions, PdfGenError,
    RenderSettings, StubEngine,
};
use tracing::debug;

use crate::cli::{Cli, EngineKind};

/// Environment variables consulted, in order, for the browser executable.
pub const EXECUTABLE_ENV_VARS: &[&str] = &["PDFGEN_EXECUTABLE_PATH", "PUPPETEER_EXECUTABLE_PATH"];

/// Resolved settings after merging CLI args, environment and config file.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub engine: EngineKind,
    pub launch: LaunchOptions,
    pub render: RenderSettings,
    pub max_concurrent_sessions: usize,
}

impl ResolvedSettings {
    pub fn dispatcher(&self) -> Dispatcher {
        let engine: Arc<dyn BrowserEngine> = match self.engine {
            EngineKind::Chromium => Arc::new(ChromiumEngine),
            EngineKind::Stub => Arc::new(StubEngine::new()),
        };
        Dispatcher::new(engine, self.launch.clone(), self.render)
            .with_max_concurrent_sessions(self.max_concurrent_sessions)
    }
}

/// Merge CLI arguments with config file, preferring CLI when flags are present.
///
/// Executable precedence: `--executable` > environment > config file.
pub fn resolve_settings(
    cli: &Cli,
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedSettings {
    let env_executable = EXECUTABLE_ENV_VARS
        .iter()
        .find_map(|name| env(name).filter(|value| !value.is_empty()))
        .map(PathBuf::from);

    let launch = config
        .launch_options()
        .with_executable(env_executable)
        .with_executable(cli.executable.clone());

    let mut render = config.render_settings();
    if let Some(secs) = cli.nav_timeout {
        render.navigation_timeout = Duration::from_secs(secs);
    }

    ResolvedSettings {
        engine: cli.engine,
        launch,
        render,
        max_concurrent_sessions: config.server.max_concurrent_sessions,
    }
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/pdfgen/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, PdfGenError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        PdfGenError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        PdfGenError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Log effective settings (debug level).
pub fn log_effective_settings(config_path: Option<&Path>, settings: &ResolvedSettings) {
    debug!("{}", format_effective_settings(config_path, settings));
}

/// Format effective settings as a single-line string.
pub fn format_effective_settings(
    config_source: Option<&Path>,
    settings: &ResolvedSettings,
) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let executable = settings
        .launch
        .executable
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "auto".to_string());
    format!(
        "Effective config [{source}]: engine={:?}, executable={}, headless={}, nav-timeout={}s, idle: max-inflight={} quiet={}ms, max-sessions={}",
        settings.engine,
        executable,
        settings.launch.headless,
        settings.render.navigation_timeout.as_secs(),
        settings.render.idle.max_inflight,
        settings.render.idle.quiet_window.as_millis(),
        settings.max_concurrent_sessions
    )
}
