//! Client configuration
//!
//! Built once by the caller and handed to [`crate::Console`] at
//! construction; nothing in the library reads the environment.

use crate::error::{PilotError, Result};
use std::time::Duration;

/// Backend origin used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8100";

/// How often takeover status is polled while a session is active
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Delay before re-listing files after a reply mentions a file
pub const DEFAULT_FILE_REFRESH_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without the `/api` suffix
    pub api_base: String,
    pub poll_interval: Duration,
    pub file_refresh_delay: Duration,
    /// Refuse chat commands unless the human has taken over the desktop
    pub require_takeover_for_chat: bool,
    /// No timeout by default; a hung request keeps its in-flight flag set
    pub request_timeout: Option<Duration>,
    /// Canned commands offered by the interactive console
    pub quick_messages: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            file_refresh_delay: DEFAULT_FILE_REFRESH_DELAY,
            require_takeover_for_chat: false,
            request_timeout: None,
            quick_messages: default_quick_messages(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::default().with_api_base(api_base)
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(PilotError::Config(format!(
                "Invalid API URL: {}. URL must start with http:// or https://",
                self.api_base
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(PilotError::Config(
                "Poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute URL of an API path such as `/api/chat`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

pub fn default_quick_messages() -> Vec<String> {
    [
        "Open Google and search for artificial intelligence",
        "Visit github.com and browse trending projects",
        "Open youtube.com and search for programming tutorials",
        "Search today's top news",
        "Write a summary of the current page to a file",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
