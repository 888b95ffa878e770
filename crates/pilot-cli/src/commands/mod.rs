//! Subcommand implementations

pub mod chat;
pub mod config;
pub mod desktop;
pub mod doctor;
pub mod files;
pub mod repl;
pub mod session;
pub mod takeover;

use crate::config::{Settings, SettingsManager};
use crate::notifier::ConsoleNotifier;
use anyhow::{anyhow, Context, Result};
use pilot_core::Console;
use std::future::Future;
use std::sync::Arc;

/// A console connected to the configured backend, plus the terminal notifier
pub struct App {
    pub console: Console,
    pub ui: Arc<ConsoleNotifier>,
    pub settings: Settings,
}

impl App {
    pub fn open(api_url: Option<&str>) -> Result<Self> {
        let settings = SettingsManager::load().context("Failed to load settings")?;
        let config = settings.client_config(api_url);
        let ui = ConsoleNotifier::new();
        let console = Console::connect(config, ui.clone())
            .map_err(|e| anyhow!("Failed to set up the API client: {}", e))?;

        Ok(Self {
            console,
            ui,
            settings,
        })
    }

    pub async fn busy<F: Future>(&self, message: &str, fut: F) -> F::Output {
        self.ui.busy(message, fut).await
    }

    /// Pull session, file and takeover state from the backend
    pub async fn sync(&self) -> Result<()> {
        self.busy("Checking session...", self.console.start()).await?;
        Ok(())
    }
}
