//! Configuration management

use anyhow::{Context, Result};
use pilot_core::config::{DEFAULT_API_BASE, DEFAULT_FILE_REFRESH_DELAY, DEFAULT_POLL_INTERVAL};
use pilot_core::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persisted CLI settings (`$PILOT_HOME/settings.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub poll_interval_secs: u64,
    pub file_refresh_delay_ms: u64,
    pub require_takeover_for_chat: bool,
    pub request_timeout_secs: Option<u64>,
    /// Where downloads land when `-o` is not given; current directory if unset
    pub download_dir: Option<PathBuf>,
    pub quick_messages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_BASE.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            file_refresh_delay_ms: DEFAULT_FILE_REFRESH_DELAY.as_millis() as u64,
            require_takeover_for_chat: false,
            request_timeout_secs: None,
            download_dir: None,
            quick_messages: pilot_core::config::default_quick_messages(),
        }
    }
}

impl Settings {
    /// Library configuration, with `api_url` taking precedence over the file
    pub fn client_config(&self, api_url: Option<&str>) -> ClientConfig {
        ClientConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            file_refresh_delay: Duration::from_millis(self.file_refresh_delay_ms),
            require_takeover_for_chat: self.require_takeover_for_chat,
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            quick_messages: self.quick_messages.clone(),
            ..ClientConfig::default()
        }
        .with_api_base(api_url.unwrap_or(&self.api_url))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub struct SettingsManager;

impl SettingsManager {
    /// Get the pilot home directory (~/.pilot)
    pub fn pilot_home() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PILOT_HOME") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".pilot"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::pilot_home()?.join("settings.json"))
    }

    /// Get the log file path used by the interactive console
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::pilot_home()?.join("pilot.log"))
    }

    /// Load settings: defaults, then the settings file, then `PILOT_*`
    /// environment variables
    pub fn load() -> Result<Settings> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Settings> {
        let layered = config::Config::builder()
            .add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix("PILOT"))
            .build()
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings from {:?}", path))
    }

    /// Save settings to disk
    pub fn save(settings: &Settings) -> Result<()> {
        Self::save_to(&Self::settings_path()?, settings)
    }

    pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        // Set permissions on Unix (restrict to owner only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }
}
