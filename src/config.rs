//! Application configuration
//!
//! Configuration comes from the environment with local-development defaults,
//! and can be adjusted programmatically through builder methods.

use crate::visualizer::{DEFAULT_BAR_COUNT, DEFAULT_SMOOTHING};

/// Environment variable naming the credential backend base URL.
pub const BACKEND_URL_ENV: &str = "PARLEY_BACKEND_URL";

/// Environment variable naming the agent to route the session to.
pub const AGENT_NAME_ENV: &str = "PARLEY_AGENT_NAME";

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Configuration for the Parley client
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the credential backend
    pub backend_url: String,

    /// Optional agent routing hint sent with the credential request
    pub agent_name: Option<String>,

    /// Number of bars in the agent activity visualizer
    pub bar_count: usize,

    /// Exponential smoothing factor for amplitude samples (0 < factor <= 1;
    /// 1.0 disables smoothing)
    pub smoothing: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            agent_name: None,
            bar_count: DEFAULT_BAR_COUNT,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment, falling back to the
    /// local-development defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                config.backend_url = url;
            }
        }
        if let Ok(name) = std::env::var(AGENT_NAME_ENV) {
            if !name.trim().is_empty() {
                config.agent_name = Some(name);
            }
        }
        config
    }

    /// Set the backend base URL
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    /// Set the agent routing hint
    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    /// Set the visualizer bar count
    pub fn with_bar_count(mut self, bar_count: usize) -> Self {
        self.bar_count = bar_count;
        self
    }

    /// Set the amplitude smoothing factor
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }
}
