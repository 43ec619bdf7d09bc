use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::browser::{IdleSettings, LaunchOptions};
use crate::render::RenderSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub browser: BrowserConfig,
    pub timeouts: Timeouts,
    pub network_idle: NetworkIdleConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    /// Quiet window for the network-idle heuristic.
    #[serde(with = "humantime_serde")]
    pub network_idle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            network_idle: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkIdleConfig {
    pub max_inflight: usize,
}

impl Default for NetworkIdleConfig {
    fn default() -> Self {
        Self { max_inflight: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_concurrent_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_concurrent_sessions: 4,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            network_idle: NetworkIdleConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// `~/.config/pdfgen/config.toml`, when a home directory is known.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("pdfgen")
                .join("config.toml")
        })
    }

    /// Loads the explicit path if given, else the central config if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::central_config_path() {
            Some(central) if central.is_file() => Self::from_file(&central),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigLoadError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.timeouts.navigation.is_zero() {
            return Err("timeouts.navigation must be greater than zero".to_string());
        }
        if self.timeouts.network_idle.is_zero() {
            return Err("timeouts.network_idle must be greater than zero".to_string());
        }
        if self.server.max_concurrent_sessions == 0 {
            return Err("server.max_concurrent_sessions must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            navigation_timeout: self.timeouts.navigation,
            idle: IdleSettings {
                max_inflight: self.network_idle.max_inflight,
                quiet_window: self.timeouts.network_idle,
            },
        }
    }

    /// Launch options with the executable taken from the config; callers may override it.
    pub fn launch_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions {
            executable: self.browser.executable.clone(),
            headless: self.browser.headless,
            ..LaunchOptions::default()
        };
        options.args.extend(self.browser.extra_args.iter().cloned());
        options
    }
}
