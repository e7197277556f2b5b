//! Application configuration and constants.

use reqwest::Url;
use thiserror::Error;

/// Environment variable naming the book service base URL.
pub const API_URL_ENV: &str = "LIBERLENS_API_URL";

/// Base URL used when neither the CLI nor the environment supplies one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Book service base URL, without a trailing slash
    pub api_base_url: String,

    /// Main loop tick rate in milliseconds (target 60 FPS = ~16ms)
    pub tick_rate_ms: u64,

    /// Terminals at most this many columns wide use the narrow layout
    pub narrow_max_width: u16,

    /// Width of the navigation drawer in characters
    pub drawer_width: u16,

    /// Ticks per spinner frame
    pub spinner_ticks_per_frame: u64,

    /// Lines to scroll the answer per key press
    pub scroll_step: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            tick_rate_ms: 16,
            narrow_max_width: 79,
            drawer_width: 28,
            spinner_ticks_per_frame: 6,
            scroll_step: 3,
        }
    }
}

impl Config {
    /// Build a config with the given base URL, falling back to the default.
    pub fn with_api_url(api_url: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = api_url {
            config.api_base_url = normalize_api_url(url)?;
        }
        Ok(config)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.api_base_url)
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.api_base_url)
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidApiUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

/// Keyboard hints shown at the bottom of the screen
pub const KEY_HINTS: &[(&str, &str)] = &[
    ("Ctrl+O", "choose book"),
    ("Ctrl+U", "upload"),
    ("Enter", "ask"),
    ("Ctrl+L", "clear"),
    ("PgUp/PgDn", "scroll"),
    ("Esc", "quit"),
];
